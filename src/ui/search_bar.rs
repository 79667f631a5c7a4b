use std::{sync::Arc, time::Duration};

use gpui::{
    AppContext, AsyncWindowContext, Context, Entity, InteractiveElement, IntoElement,
    ParentElement, Render, ScrollHandle, Styled, Subscription, Task, WeakEntity, Window, div,
};
use gpui_component::StyledExt;
use gpui_component::input::{Input, InputEvent, InputState};
use tokio::{runtime::Handle, sync::mpsc::UnboundedReceiver};

use crate::search::{
    Registry, SearchResult,
    driver::SearchLoop,
    view::{ResultView, UiUpdate},
};
use crate::ui::search_results::SearchResultsList;
use crate::{EnterPressed, EscPressed, SelectNext, SelectPrevious};

/// What every launcher window shares.
#[derive(Clone)]
pub struct Launcher {
    pub registry: Arc<Registry>,
    /// Runtime the registry's provider tasks are spawned on
    pub runtime: Handle,
    pub search_delay: Duration,
    pub max_results: usize,
}

impl Launcher {
    /// Runs the action of `result`, logging instead of failing.
    pub fn execute(&self, result: &SearchResult) {
        if let Err(err) = self.registry.execute_result(result) {
            tracing::error!(title = %result.title, error = %err, "failed to run result");
        }
    }
}

pub struct SearchBar {
    launcher: Launcher,
    search: SearchLoop,
    view: ResultView,
    input_state: Entity<InputState>,
    scroll_handle: ScrollHandle,
    dismissed: bool,
    #[expect(unused)]
    updates_task: Task<()>,
    #[expect(unused)]
    subscriptions: Vec<Subscription>,
}

impl SearchBar {
    pub fn new(window: &mut Window, cx: &mut Context<Self>, launcher: Launcher) -> Self {
        let input_state = cx.new(|cx| {
            let is = InputState::new(window, cx).placeholder("Search apps, commands, the web...");
            is.focus(window, cx);
            is
        });

        let subscriptions = vec![cx.subscribe_in(&input_state, window, {
            let input_state = input_state.clone();
            move |this, _, ev: &InputEvent, window, cx| match ev {
                InputEvent::Change => {
                    let query = input_state.read(cx).value().to_string();
                    this.input_changed(query);
                }
                InputEvent::PressEnter { .. } => this.confirm(window, cx),
                _ => {}
            }
        })];

        let (search, updates) = SearchLoop::new(launcher.registry.clone(), launcher.search_delay);
        let updates_task = cx.spawn_in(window, async move |this, cx| {
            apply_updates(updates, this, cx).await;
        });

        let view = ResultView::new().with_max_results(launcher.max_results);

        Self {
            launcher,
            search,
            view,
            input_state,
            scroll_handle: ScrollHandle::new(),
            dismissed: false,
            updates_task,
            subscriptions,
        }
    }

    /// Supersedes the current revision and schedules a debounced search.
    fn input_changed(&mut self, query: String) {
        let _guard = self.launcher.runtime.enter();
        self.search.input_changed(query);
    }

    fn confirm(&mut self, window: &mut Window, cx: &mut Context<Self>) {
        if self.dismissed {
            return;
        }

        if let Some(result) = self.view.selected().cloned() {
            self.launcher.execute(&result);
            self.dismiss(window, cx);
        }
    }

    fn dismiss(&mut self, window: &mut Window, _cx: &mut Context<Self>) {
        self.dismissed = true;
        self.search.cancel();
        window.remove_window();
    }
}

/// Feeds every update from the search loop into the window's view until the
/// loop or the window goes away.
async fn apply_updates(
    mut updates: UnboundedReceiver<UiUpdate>,
    this: WeakEntity<SearchBar>,
    cx: &mut AsyncWindowContext,
) {
    while let Some(update) = updates.recv().await {
        let applied = this.update(cx, |this, cx| {
            if this.view.apply(update) {
                cx.notify();
            }
        });
        if applied.is_err() {
            return;
        }
    }
}

impl Render for SearchBar {
    fn render(&mut self, _window: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        let launcher = self.launcher.clone();
        let control = self.search.control().clone();
        let on_confirm = Arc::new(move |result: &SearchResult, window: &mut Window, _cx: &mut gpui::App| {
            launcher.execute(result);
            control.cancel();
            window.remove_window();
        });

        div()
            .v_flex()
            .p_5()
            .gap_2()
            .size_full()
            .items_center()
            .justify_center()
            .on_action(cx.listener(|this, &EscPressed, window, cx| {
                this.dismiss(window, cx);
            }))
            .on_action(cx.listener(|this, &EnterPressed, window, cx| {
                this.confirm(window, cx);
            }))
            .on_action(cx.listener(|this, &SelectNext, _window, cx| {
                this.view.select_next();
                cx.notify();
            }))
            .on_action(cx.listener(|this, &SelectPrevious, _window, cx| {
                this.view.select_previous();
                cx.notify();
            }))
            .child(Input::new(&self.input_state).border_2())
            .child(
                div()
                    .v_flex()
                    .gap_2()
                    .size_full()
                    .overflow_y_hidden()
                    .child(SearchResultsList::new(
                        self.view.results().cloned().collect(),
                        self.view.selected_index(),
                        self.view.placeholder(),
                        self.scroll_handle.clone(),
                        on_confirm,
                    )),
            )
    }
}
