//! Lobster Clipper: download a YouTube video and losslessly trim a clip from it

// Main window, screens and worker wiring
mod app;
// Persisted settings
mod config;
// yt-dlp metadata probe and download worker
mod downloader;
mod easing;
// Filename sanitizing and time labels
mod format;
// Preview frames extracted with ffmpeg
mod frames;
mod loader;
// Data shared between workers and the UI
mod model;
mod playback;
// Progress parsing utilities
mod progress;
// Three-handle range selection widget
mod range_slider;
mod splash;
mod theme;
// Poster fetching and image decoding
mod thumbnail;
// Stream-copy cut with ffmpeg
mod trim;

use std::sync::Arc;
use anyhow::anyhow;
use eframe::egui;
// OnceCell for single-time runtime initialization
use once_cell::sync::OnceCell;
use tokio::runtime::Runtime;

use app::ClipperApp;
use config::AppConfig;

// Global Tokio runtime stored in a OnceCell for lazy init
static RUNTIME: OnceCell<Arc<Runtime>> = OnceCell::new();

/// Program entry point: initializes logging and the runtime, then launches the GUI
fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = AppConfig::load();
    let rt = RUNTIME.get_or_try_init(|| Runtime::new().map(Arc::new))?;
    let handle = rt.handle().clone();

    // Frameless fixed-size window; the title bar is drawn by the app
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([900.0, 540.0])
            .with_resizable(false)
            .with_decorations(false)
            .with_title("Lobster Clipper"),
        ..Default::default()
    };

    log::info!("Starting Lobster Clipper");
    eframe::run_native(
        "Lobster Clipper",
        options,
        Box::new(move |cc| {
            theme::apply(&cc.egui_ctx, config.font_path.as_deref());
            Box::new(ClipperApp::new(config, handle))
        }),
    )
    .map_err(|e| anyhow!("Failed to run app: {}", e))
}
