use std::path::PathBuf;

use clap::Parser;
use eframe::egui;
use news_dashboard::app::NewsDashboardApp;

/// Browse, filter and export a table of news stories.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Arguments {
    /// Story table to open at start-up (.csv, .xlsx, .xls, .ods, .json, .parquet).
    path: Option<PathBuf>,

    /// Load the bundled sample stories at start-up.
    #[arg(long, conflicts_with = "path")]
    sample: bool,
}

fn main() -> eframe::Result {
    env_logger::init();
    let args = Arguments::parse();

    let mut app = NewsDashboardApp::default();
    if let Some(path) = &args.path {
        app.state.load_path(path);
    } else if args.sample {
        app.state.load_sample();
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        "News Dashboard",
        options,
        Box::new(|_cc| Ok(Box::new(app))),
    )
}
