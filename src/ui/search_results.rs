use std::{ops::Neg, sync::Arc};

use gpui::{
    App, ElementId, Fill, Image, ImageFormat, InteractiveElement, IntoElement, MouseButton,
    ParentElement, Point, RenderOnce, ScrollHandle, SharedString, StatefulInteractiveElement,
    Styled, Window, div, img, prelude::FluentBuilder,
};
use gpui_component::ActiveTheme;

use crate::search::{Icon, SearchResult, view::Placeholder};

/// Height of a row plus its vertical margins, in pixels.
const ROW_HEIGHT: usize = 40 + 2 + 2;

/// Called with the clicked result.
pub type OnConfirm = Arc<dyn Fn(&SearchResult, &mut Window, &mut App)>;

#[derive(IntoElement)]
pub struct SearchResultsList {
    results: Vec<SearchResult>,
    selected_result: usize,
    placeholder: Placeholder,
    scroll_handle: ScrollHandle,
    on_confirm: OnConfirm,
}

impl SearchResultsList {
    #[must_use]
    pub fn new(
        results: Vec<SearchResult>,
        selected_result: usize,
        placeholder: Placeholder,
        scroll_handle: ScrollHandle,
        on_confirm: OnConfirm,
    ) -> Self {
        Self {
            results,
            selected_result,
            placeholder,
            scroll_handle,
            on_confirm,
        }
    }
}

fn icon_element(icon: &Icon) -> gpui::AnyElement {
    match icon {
        Icon::Symbol(symbol) => div()
            .w_7()
            .flex_none()
            .text_center()
            .child(SharedString::from(*symbol))
            .into_any_element(),
        Icon::Png(bytes) => img(Arc::new(Image::from_bytes(ImageFormat::Png, bytes.to_vec())))
            .h_7()
            .w_7()
            .into_any_element(),
    }
}

impl RenderOnce for SearchResultsList {
    fn render(self, _window: &mut Window, cx: &mut App) -> impl IntoElement {
        let message = match &self.placeholder {
            Placeholder::None => None,
            Placeholder::NoResults => Some(SharedString::from("No results found")),
            Placeholder::Error(err) => Some(SharedString::from(format!("Error: {err}"))),
        };

        let scroll_handle = self.scroll_handle.clone();
        let selected_result = self.selected_result;
        let on_confirm = self.on_confirm;

        div()
            .id("search-results")
            .size_full()
            .flex()
            .flex_col()
            .overflow_y_scroll()
            .track_scroll(&self.scroll_handle)
            .when_some(message, |this, message| {
                this.child(
                    div()
                        .p_2()
                        .text_color(cx.theme().muted_foreground)
                        .child(message),
                )
            })
            .children(self.results.into_iter().enumerate().map(|(i, result)| {
                let title = SharedString::from(result.title.to_string());
                let description = SharedString::from(result.description.to_string());
                let icon = result.icon.as_ref().map(icon_element);
                let on_confirm = on_confirm.clone();

                div()
                    .id(ElementId::named_usize(title.clone(), i))
                    .p_0p5()
                    .pl_2()
                    // 40 px element
                    .min_h_10()
                    .h_10()
                    // 2px margin
                    .m_0p5()
                    .when(i == selected_result, |mut this| {
                        this.style().background =
                            Some(Fill::Color(cx.theme().secondary_hover.into()));

                        #[allow(
                            clippy::cast_precision_loss,
                            reason = "we don't need high precision, div el height is tiny"
                        )]
                        scroll_handle.set_offset(Point::new(
                            0f64.into(),
                            ((i * ROW_HEIGHT) as f64).neg().into(),
                        ));

                        this
                    })
                    .hover(|style| style.bg(cx.theme().secondary_hover))
                    .on_mouse_down(MouseButton::Left, move |_, window, cx| {
                        on_confirm(&result, window, cx);
                    })
                    .child(
                        div()
                            .flex()
                            .items_center()
                            .gap_2()
                            .when_some(icon, |this, icon| this.child(icon))
                            .child(
                                div()
                                    .flex()
                                    .flex_col()
                                    .overflow_hidden()
                                    .child(title)
                                    .when(!description.is_empty(), |this| {
                                        this.child(
                                            div()
                                                .text_xs()
                                                .text_color(cx.theme().muted_foreground)
                                                .child(description),
                                        )
                                    }),
                            ),
                    )
            }))
    }
}
