use std::{
    path::PathBuf,
    process::Stdio,
    sync::{Arc, Mutex},
};
use anyhow::{anyhow, bail, Context};
use eframe::egui::{self, ColorImage};
use tokio::{
    process::Command,
    runtime::Handle,
    sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender},
};
use crate::{format::tool_error, thumbnail::decode_image};

/// Width preview frames are scaled down to
const PREVIEW_WIDTH: u32 = 854;
/// Smallest playhead move worth a new frame while playing
pub const MIN_STEP: f64 = 0.25;

/// A decoded frame and the timestamp it was taken at
pub struct PreviewFrame {
    pub seconds: f64,
    pub image: ColorImage,
}

pub fn frame_args(source: &str, seconds: f64) -> Vec<String> {
    vec![
        "-hide_banner".to_owned(),
        "-loglevel".to_owned(),
        "error".to_owned(),
        "-ss".to_owned(),
        format!("{:.3}", seconds.max(0.0)),
        "-i".to_owned(),
        source.to_owned(),
        "-frames:v".to_owned(),
        "1".to_owned(),
        "-vf".to_owned(),
        format!("scale='min({},iw)':-2", PREVIEW_WIDTH),
        "-f".to_owned(),
        "image2pipe".to_owned(),
        "-c:v".to_owned(),
        "png".to_owned(),
        "pipe:1".to_owned(),
    ]
}

/// Extracts a single frame at `seconds` with ffmpeg.
pub async fn grab_frame(ffmpeg: &str, source: &str, seconds: f64) -> anyhow::Result<ColorImage> {
    let out = Command::new(ffmpeg)
        .args(frame_args(source, seconds))
        .stdin(Stdio::null())
        .kill_on_drop(true)
        .output()
        .await
        .with_context(|| format!("Could not start {}", ffmpeg))?;
    if !out.status.success() {
        bail!(tool_error(ffmpeg, out.status, &out.stderr));
    }
    decode_image(&out.stdout).ok_or_else(|| anyhow!("ffmpeg produced no frame at {:.1}s", seconds))
}

/// Background worker turning playhead positions into preview images.
///
/// Requests queue on a channel; the worker only renders the newest one, so
/// fast scrubbing never builds a backlog of ffmpeg runs.
pub struct FrameGrabber {
    tx: UnboundedSender<f64>,
    latest: Arc<Mutex<Option<PreviewFrame>>>,
    last_requested: Option<f64>,
}

impl FrameGrabber {
    pub fn spawn(rt: &Handle, ffmpeg: String, source: PathBuf, ctx: egui::Context) -> Self {
        let (tx, rx) = unbounded_channel();
        let latest = Arc::new(Mutex::new(None));
        rt.spawn(run(rx, ffmpeg, source, Arc::clone(&latest), ctx));
        Self { tx, latest, last_requested: None }
    }

    /// Asks for the frame at `seconds`; small moves are skipped unless `force`.
    pub fn request(&mut self, seconds: f64, force: bool) {
        if !should_request(self.last_requested, seconds, force) {
            return;
        }
        self.last_requested = Some(seconds);
        let _ = self.tx.send(seconds);
    }

    pub fn take_latest(&self) -> Option<PreviewFrame> {
        self.latest.lock().ok()?.take()
    }
}

pub fn should_request(last: Option<f64>, seconds: f64, force: bool) -> bool {
    match last {
        _ if force => true,
        None => true,
        Some(prev) => (seconds - prev).abs() >= MIN_STEP,
    }
}

async fn run(
    mut rx: UnboundedReceiver<f64>,
    ffmpeg: String,
    source: PathBuf,
    latest: Arc<Mutex<Option<PreviewFrame>>>,
    ctx: egui::Context,
) {
    let source = source.display().to_string();
    while let Some(mut seconds) = rx.recv().await {
        while let Ok(newer) = rx.try_recv() {
            seconds = newer;
        }
        match grab_frame(&ffmpeg, &source, seconds).await {
            Ok(image) => {
                if let Ok(mut slot) = latest.lock() {
                    *slot = Some(PreviewFrame { seconds, image });
                }
                ctx.request_repaint();
            }
            Err(e) => log::warn!("Preview frame at {:.1}s failed: {:#}", seconds, e),
        }
    }
    log::debug!("Preview worker for {} stopped", source);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_command_pipes_one_png() {
        let args = frame_args("/tmp/a.mp4", 12.5);
        let at = |flag: &str| args[args.iter().position(|a| a == flag).unwrap() + 1].clone();
        assert_eq!(at("-ss"), "12.500");
        assert_eq!(at("-i"), "/tmp/a.mp4");
        assert_eq!(at("-frames:v"), "1");
        assert_eq!(at("-c:v"), "png");
        assert_eq!(args.last().map(String::as_str), Some("pipe:1"));
    }

    #[test]
    fn small_moves_are_coalesced() {
        assert!(should_request(None, 3.0, false));
        assert!(!should_request(Some(3.0), 3.1, false));
        assert!(should_request(Some(3.0), 3.1, true));
        assert!(should_request(Some(3.0), 2.7, false));
    }

    #[tokio::test]
    async fn missing_ffmpeg_is_an_error() {
        let err = grab_frame("lobster-no-such-ffmpeg", "/tmp/a.mp4", 1.0).await.unwrap_err();
        assert!(format!("{:#}", err).contains("lobster-no-such-ffmpeg"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn empty_output_is_no_frame() {
        // `true` exits cleanly without writing a PNG
        let err = grab_frame("true", "/tmp/a.mp4", 2.0).await.unwrap_err();
        assert!(err.to_string().contains("no frame at 2.0s"));
    }
}
