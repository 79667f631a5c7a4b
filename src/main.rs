use std::sync::Arc;

use clap::Parser;
use gpui::{
    AppContext, Application, Bounds, Pixels, Point, WindowBackgroundAppearance, WindowBounds,
    WindowKind, WindowOptions, actions,
};
use gpui_component::Root;
use rootcause::Report;

use crate::{
    cli::Cli,
    fs::config::Configuration,
    hotkey::HotkeyService,
    search::Registry,
    ui::search_bar::{Launcher, SearchBar},
};

pub mod apps;
pub mod cli;
pub mod command;
pub mod extensions;
pub mod fs;
pub mod headless;
pub mod hotkey;
pub mod logging;
pub mod search;
pub mod ui;

const APP_NAME: &str = "Scout";

actions!(
    actions_namespace,
    [EnterPressed, EscPressed, SelectNext, SelectPrevious]
);

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    if let Err(err) = run(cli) {
        tracing::error!("{err}");
        eprintln!("{err:?}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Report> {
    let config = Configuration::load(cli.config.as_deref())?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .thread_name("scout-search")
        .enable_all()
        .build()?;

    let mut registry = Registry::new().with_provider_timeout(config.provider_timeout());
    extensions::register_builtins(&mut registry, &config);
    let registry = Arc::new(registry);

    if let Some(query) = cli.query {
        let view = runtime.block_on(headless::search(
            registry,
            &query,
            config.search_delay(),
            config.max_results,
        ));
        headless::print(&view, &mut std::io::stdout().lock())?;
        return Ok(());
    }

    let launcher = Launcher {
        registry,
        runtime: runtime.handle().clone(),
        search_delay: config.search_delay(),
        max_results: config.max_results,
    };

    run_launcher(&config, launcher)
}

#[cfg(target_os = "macos")]
fn register_launch_at_login() {
    use smappservice_rs::{AppService, ServiceStatus, ServiceType};

    let app_service = AppService::new(ServiceType::MainApp);

    match app_service.status() {
        // Either it's already enabled, or user/macOS did not allow
        // Scout to start, so, leave it as-is.
        ServiceStatus::Enabled | ServiceStatus::RequiresApproval => {}
        ServiceStatus::NotRegistered | ServiceStatus::NotFound => {
            if let Err(err) = app_service.register() {
                tracing::warn!(error = ?err, "registering app for auto-start failed");
            }
        }
    }
}

#[cfg(not(target_os = "macos"))]
fn register_launch_at_login() {
    tracing::debug!("launch at login is only supported on macOS");
}

fn window_options(display_center: Point<Pixels>) -> WindowOptions {
    WindowOptions {
        window_bounds: Some(WindowBounds::Windowed(Bounds::centered_at(
            display_center,
            gpui::Size {
                width: Pixels::from(560u32),
                height: Pixels::from(380u32),
            },
        ))),
        focus: true,
        show: true,
        kind: WindowKind::PopUp,
        is_resizable: false,
        window_decorations: None,
        titlebar: None,
        window_background: WindowBackgroundAppearance::Transparent,
        app_id: Some(APP_NAME.to_string()),
        tabbing_identifier: None,
        ..Default::default()
    }
}

fn run_launcher(config: &Configuration, launcher: Launcher) -> Result<(), Report> {
    let mut hotkeys = HotkeyService::new(&config.open_search_hotkey)?;
    hotkeys.start()?;

    if config.launch_on_boot {
        register_launch_at_login();
    }

    let app = Application::new();

    app.run(move |cx| {
        cx.bind_keys([
            gpui::KeyBinding::new("enter", EnterPressed, None),
            gpui::KeyBinding::new("escape", EscPressed, None),
            gpui::KeyBinding::new("down", SelectNext, None),
            gpui::KeyBinding::new("ctrl-n", SelectNext, None),
            gpui::KeyBinding::new("up", SelectPrevious, None),
            gpui::KeyBinding::new("ctrl-p", SelectPrevious, None),
        ]);
        // This must be called before using any GPUI Component features.
        gpui_component::init(cx);

        let Some(display) = cx.primary_display() else {
            tracing::error!("no display available");
            cx.quit();
            return;
        };
        let display_center = display.bounds().center();

        cx.spawn(async move |cx| {
            loop {
                // Await hotkey
                let Some(event) = cx
                    .background_executor()
                    .spawn(async move { HotkeyService::wait_for_event() })
                    .await
                else {
                    tracing::warn!("hotkey channel closed");
                    break;
                };

                if !hotkeys.is_activation(&event) {
                    continue;
                }

                // App lists and command files may have changed since the
                // last activation
                let registry = launcher.registry.clone();
                launcher
                    .runtime
                    .spawn_blocking(move || registry.refresh_providers());

                let opened = cx.open_window(window_options(display_center), |window, cx| {
                    let launcher = launcher.clone();
                    let view = cx.new(|cx| SearchBar::new(window, cx, launcher));

                    cx.new(|cx| Root::new(view, window, cx))
                });

                if let Err(err) = opened {
                    tracing::error!(error = %err, "failed to open launcher window");
                }
            }

            hotkeys.stop();
        })
        .detach();
    });

    Ok(())
}
