mod app;
mod audio;
mod config;
mod messages;
mod morse;
mod playback;
mod practice;
mod ui;

use app::KochApp;

fn main() -> Result<(), eframe::Error> {
    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([560.0, 520.0])
            .with_min_inner_size([440.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Koch Trainer",
        options,
        Box::new(|cc| Ok(Box::new(KochApp::new(cc)))),
    )
}
