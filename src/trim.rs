use std::{
    path::{Path, PathBuf},
    process::Stdio,
};
use anyhow::{bail, Context};
use tokio::process::Command;
use crate::{format::tool_error, model::TrimEvent};

/// A lossless cut of `[start, end)` seconds from `source` into `destination`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrimRequest {
    pub source: PathBuf,
    pub start: u64,
    pub end: u64,
    pub destination: PathBuf,
}

/// Rejects empty or inverted selections.
pub fn validate_range(start: u64, end: u64) -> anyhow::Result<()> {
    if end <= start {
        bail!("End must be after Start.");
    }
    Ok(())
}

/// Default file name offered in the save dialog: `<stem>.trim.mp4`
pub fn suggested_name(source: &Path) -> String {
    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "clip".to_string());
    format!("{}.trim.mp4", stem)
}

impl TrimRequest {
    pub fn new(source: PathBuf, start: u64, end: u64, destination: PathBuf) -> anyhow::Result<Self> {
        validate_range(start, end)?;
        Ok(Self { source, start, end, destination })
    }

    /// Arguments for a stream-copy cut, no re-encode
    pub fn ffmpeg_args(&self) -> Vec<String> {
        vec![
            "-hide_banner".to_owned(),
            "-loglevel".to_owned(),
            "error".to_owned(),
            "-ss".to_owned(),
            self.start.to_string(),
            "-to".to_owned(),
            self.end.to_string(),
            "-i".to_owned(),
            self.source.display().to_string(),
            "-c".to_owned(),
            "copy".to_owned(),
            self.destination.display().to_string(),
        ]
    }
}

async fn run_ffmpeg(ffmpeg: &str, request: &TrimRequest) -> anyhow::Result<()> {
    log::info!(
        "Trimming {} [{}s, {}s) -> {}",
        request.source.display(),
        request.start,
        request.end,
        request.destination.display()
    );
    let out = Command::new(ffmpeg)
        .args(request.ffmpeg_args())
        .stdin(Stdio::null())
        .output()
        .await
        .with_context(|| format!("Could not start {}", ffmpeg))?;
    if !out.status.success() {
        bail!(tool_error(ffmpeg, out.status, &out.stderr));
    }
    Ok(())
}

/// Runs the cut, then deletes the session directory whatever the outcome.
pub async fn run_trim(ffmpeg: String, request: TrimRequest, cleanup: Option<PathBuf>) -> TrimEvent {
    let event = match run_ffmpeg(&ffmpeg, &request).await {
        Ok(()) => {
            log::info!("Clip saved to {}", request.destination.display());
            TrimEvent::Saved(request.destination.clone())
        }
        Err(e) => {
            log::error!("Trim failed: {:#}", e);
            TrimEvent::Failed(format!("{:#}", e))
        }
    };
    if let Some(dir) = cleanup {
        match tokio::fs::remove_dir_all(&dir).await {
            Ok(()) => log::debug!("Removed session directory {}", dir.display()),
            Err(e) => log::warn!("Could not remove {}: {}", dir.display(), e),
        }
    }
    event
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> TrimRequest {
        TrimRequest::new("/tmp/lobster_a/Cat.mp4".into(), 5, 65, "/home/me/Cat.trim.mp4".into()).unwrap()
    }

    #[test]
    fn inverted_or_empty_ranges_are_rejected() {
        assert!(validate_range(50, 20).is_err());
        assert!(validate_range(20, 20).is_err());
        assert!(validate_range(20, 21).is_ok());
        assert!(TrimRequest::new("a.mp4".into(), 50, 20, "b.mp4".into()).is_err());
    }

    #[test]
    fn builds_stream_copy_command() {
        let args = request().ffmpeg_args();
        assert_eq!(
            args,
            [
                "-hide_banner", "-loglevel", "error", "-ss", "5", "-to", "65", "-i",
                "/tmp/lobster_a/Cat.mp4", "-c", "copy", "/home/me/Cat.trim.mp4",
            ]
        );
    }

    #[test]
    fn suggests_trim_suffix() {
        assert_eq!(suggested_name(Path::new("/tmp/x/My Video.mp4")), "My Video.trim.mp4");
        assert_eq!(suggested_name(Path::new("/")), "clip.trim.mp4");
    }

    #[tokio::test]
    async fn missing_transcoder_fails_and_still_cleans_up() {
        let dir = tempfile::Builder::new().prefix("lobster_test_").tempdir().unwrap().into_path();
        let event = run_trim("lobster-no-such-ffmpeg".into(), request(), Some(dir.clone())).await;
        assert!(matches!(event, TrimEvent::Failed(ref m) if m.contains("lobster-no-such-ffmpeg")));
        assert!(!dir.exists());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn nonzero_exit_is_reported() {
        // `false` ignores its arguments and exits with status 1
        let dir = tempfile::Builder::new().prefix("lobster_test_").tempdir().unwrap().into_path();
        let event = run_trim("false".into(), request(), Some(dir.clone())).await;
        match event {
            TrimEvent::Failed(msg) => assert!(msg.starts_with("false exited with")),
            other => panic!("unexpected {:?}", other),
        }
        assert!(!dir.exists());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn zero_exit_reports_destination() {
        let event = run_trim("true".into(), request(), None).await;
        assert_eq!(event, TrimEvent::Saved("/home/me/Cat.trim.mp4".into()));
    }
}
