use eframe::egui;
use lanegraph::state::AppConfig;
use lanegraph::LaneGraphApp;
use std::path::PathBuf;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let initial_repository = std::env::args_os().nth(1).map(PathBuf::from);
    let config = AppConfig::load();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([config.window_size.0, config.window_size.1])
            .with_min_inner_size([640.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        "lanegraph",
        options,
        Box::new(move |_cc| Ok(Box::new(LaneGraphApp::new(config, initial_repository)))),
    )
    .map_err(|e| anyhow::anyhow!("Failed to start the application: {e}"))
}
