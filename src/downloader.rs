use std::{
    path::{Path, PathBuf},
    process::Stdio,
};
use anyhow::{anyhow, bail, Context};
use serde::Deserialize;
use tokio::{
    io::{AsyncBufReadExt, AsyncReadExt, BufReader},
    process::Command,
    sync::mpsc::UnboundedSender,
};
use crate::{
    config::AppConfig,
    format::{sanitize, tool_error},
    model::DownloadEvent,
    progress::{parse_progress_from_line, progress_template},
};

/// yt-dlp settings copied out of the config for one download
#[derive(Debug, Clone)]
pub struct DownloadOptions {
    pub ytdlp: String,
    pub format: String,
    pub merge_format: String,
    pub concurrent_fragments: u32,
}

impl From<&AppConfig> for DownloadOptions {
    fn from(cfg: &AppConfig) -> Self {
        Self {
            ytdlp: cfg.ytdlp_binary.clone(),
            format: cfg.download_format.clone(),
            merge_format: cfg.merge_format.clone(),
            concurrent_fragments: cfg.concurrent_fragments.max(1),
        }
    }
}

/// Subset of `yt-dlp --dump-single-json` we care about
#[derive(Debug, Deserialize)]
pub struct VideoInfo {
    pub title: Option<String>,
    pub duration: Option<f64>,
    pub thumbnail: Option<String>,
}

impl VideoInfo {
    pub fn title(&self) -> &str {
        self.title.as_deref().filter(|t| !t.trim().is_empty()).unwrap_or("clip")
    }

    /// Whole seconds, at least one; live streams and some extractors report
    /// none.
    pub fn duration_secs(&self) -> anyhow::Result<u64> {
        match self.duration {
            Some(d) if d.is_finite() && d > 0.0 => Ok((d as u64).max(1)),
            _ => bail!("Video duration is unavailable for this URL."),
        }
    }
}

pub fn parse_video_info(json: &[u8]) -> anyhow::Result<VideoInfo> {
    serde_json::from_slice(json).context("yt-dlp returned unreadable metadata")
}

pub fn probe_args(url: &str) -> Vec<String> {
    vec![
        "--dump-single-json".to_owned(),
        "--no-playlist".to_owned(),
        "--skip-download".to_owned(),
        "--no-warnings".to_owned(),
        url.to_owned(),
    ]
}

/// Output template for yt-dlp; `%` in the title must not be read as a field.
pub fn output_template(dir: &Path, stem: &str) -> String {
    let escaped = stem.replace('%', "%%");
    format!("{}/{}.%(ext)s", dir.display(), escaped)
}

pub fn download_args(opts: &DownloadOptions, url: &str, template: &str) -> Vec<String> {
    vec![
        "-f".to_owned(),
        opts.format.clone(),
        "--concurrent-fragments".to_owned(),
        opts.concurrent_fragments.to_string(),
        "--merge-output-format".to_owned(),
        opts.merge_format.clone(),
        "--no-playlist".to_owned(),
        "--quiet".to_owned(),
        "--progress".to_owned(),
        "--newline".to_owned(),
        "--progress-template".to_owned(),
        progress_template(),
        "-o".to_owned(),
        template.to_owned(),
        url.to_owned(),
    ]
}

async fn probe(opts: &DownloadOptions, url: &str) -> anyhow::Result<VideoInfo> {
    log::info!("Probing metadata for {}", url);
    let out = Command::new(&opts.ytdlp)
        .args(probe_args(url))
        .stdin(Stdio::null())
        .output()
        .await
        .with_context(|| format!("Could not start {}", opts.ytdlp))?;
    if !out.status.success() {
        bail!(tool_error(&opts.ytdlp, out.status, &out.stderr));
    }
    parse_video_info(&out.stdout)
}

/// Probes `url`, downloads it into `dir` and returns the muxed file and its
/// duration. Progress and metadata go out through `events` as they arrive.
pub async fn download(
    url: &str,
    dir: &Path,
    opts: &DownloadOptions,
    events: &UnboundedSender<DownloadEvent>,
) -> anyhow::Result<(PathBuf, u64)> {
    let info = probe(opts, url).await?;
    let duration = info.duration_secs()?;
    let title = info.title().to_string();
    let _ = events.send(DownloadEvent::Metadata {
        title: title.clone(),
        duration,
        thumbnail: info.thumbnail.clone(),
    });

    let stem = sanitize(&title);
    let template = output_template(dir, &stem);
    log::info!("Downloading \"{}\" ({}s) into {}", title, duration, dir.display());

    let mut child = Command::new(&opts.ytdlp)
        .args(download_args(opts, url, &template))
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .with_context(|| format!("Could not start {}", opts.ytdlp))?;

    let mut stderr = child.stderr.take().ok_or_else(|| anyhow!("yt-dlp stderr was not captured"))?;
    let stderr_task = tokio::spawn(async move {
        let mut buf = Vec::new();
        let _ = stderr.read_to_end(&mut buf).await;
        buf
    });

    let out = child.stdout.take().ok_or_else(|| anyhow!("yt-dlp stdout was not captured"))?;
    let mut lines = BufReader::new(out).lines();
    while let Some(line) = lines.next_line().await? {
        match parse_progress_from_line(&line) {
            Some(pct) => {
                let _ = events.send(DownloadEvent::Progress(pct));
            }
            None => log::debug!("yt-dlp> {}", line),
        }
    }

    let status = child.wait().await?;
    let err = stderr_task.await.unwrap_or_default();
    if !status.success() {
        bail!(tool_error(&opts.ytdlp, status, &err));
    }

    let path = dir.join(format!("{}.{}", stem, opts.merge_format));
    if !path.exists() {
        bail!("Download finished but .{} not found.", opts.merge_format);
    }
    let path = path.canonicalize().unwrap_or(path);
    Ok((path, duration))
}

/// Runs one download to completion and reports the terminal outcome.
pub async fn spawn_download(
    url: String,
    dir: PathBuf,
    opts: DownloadOptions,
    events: UnboundedSender<DownloadEvent>,
) {
    match download(&url, &dir, &opts, &events).await {
        Ok((path, duration)) => {
            log::info!("Download complete: {}", path.display());
            let _ = events.send(DownloadEvent::Progress(100));
            let _ = events.send(DownloadEvent::Finished { path, duration });
        }
        Err(e) => {
            log::error!("Download of {} failed: {:#}", url, e);
            let _ = events.send(DownloadEvent::Failed(format!("{:#}", e)));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc::unbounded_channel;

    fn opts(bin: &str) -> DownloadOptions {
        DownloadOptions {
            ytdlp: bin.to_string(),
            ..DownloadOptions::from(&AppConfig::default())
        }
    }

    #[test]
    fn metadata_fields_are_optional() {
        let info = parse_video_info(br#"{"title": "Cat", "duration": 212.4, "thumbnail": "https://i.ytimg.com/x.jpg", "id": "abc"}"#).unwrap();
        assert_eq!(info.title(), "Cat");
        assert_eq!(info.duration_secs().unwrap(), 212);
        assert_eq!(info.thumbnail.as_deref(), Some("https://i.ytimg.com/x.jpg"));

        let bare = parse_video_info(b"{}").unwrap();
        assert_eq!(bare.title(), "clip");
        assert!(bare.duration_secs().is_err());
    }

    #[test]
    fn sub_second_clip_still_has_a_duration() {
        let short = parse_video_info(br#"{"title": "Blink", "duration": 0.4}"#).unwrap();
        assert_eq!(short.duration_secs().unwrap(), 1);
        let zero = parse_video_info(br#"{"duration": 0}"#).unwrap();
        assert!(zero.duration_secs().is_err());
    }

    #[test]
    fn garbage_metadata_is_an_error() {
        assert!(parse_video_info(b"ERROR: not json").is_err());
    }

    #[test]
    fn template_escapes_percent() {
        let t = output_template(Path::new("/tmp/lobster_x"), "100% real");
        assert_eq!(t, "/tmp/lobster_x/100%% real.%(ext)s");
    }

    #[test]
    fn download_args_carry_format_and_container() {
        let o = opts("yt-dlp");
        let args = download_args(&o, "https://youtu.be/abc", "/tmp/a/%(ext)s");
        let pos = |flag: &str| args.iter().position(|a| a == flag).unwrap();
        assert_eq!(args[pos("-f") + 1], o.format);
        assert_eq!(args[pos("--merge-output-format") + 1], "mp4");
        assert_eq!(args[pos("--concurrent-fragments") + 1], "8");
        assert_eq!(args[pos("-o") + 1], "/tmp/a/%(ext)s");
        assert_eq!(args.last().map(String::as_str), Some("https://youtu.be/abc"));
    }

    #[tokio::test]
    async fn missing_binary_reports_single_failure() {
        let (tx, mut rx) = unbounded_channel();
        let dir = std::env::temp_dir();
        spawn_download("https://youtu.be/abc".into(), dir, opts("lobster-no-such-ytdlp"), tx).await;
        match rx.recv().await {
            Some(DownloadEvent::Failed(msg)) => assert!(msg.contains("lobster-no-such-ytdlp")),
            other => panic!("unexpected event {:?}", other),
        }
        assert!(rx.recv().await.is_none());
    }

    /// Writes a stand-in for yt-dlp: it answers the metadata probe, prints one
    /// progress line and, if asked to, leaves the merged file behind.
    #[cfg(unix)]
    fn fake_ytdlp(dir: &Path, writes_file: bool) -> String {
        use std::os::unix::fs::PermissionsExt;

        let touch = if writes_file { r#"touch "$(dirname "$out")/Cat.mp4""# } else { "" };
        let script = format!(
            r#"#!/bin/sh
if [ "$1" = "--dump-single-json" ]; then
  echo '{{"title": "Cat", "duration": 9.6}}'
  exit 0
fi
while [ $# -gt 0 ]; do
  if [ "$1" = "-o" ]; then out="$2"; fi
  shift
done
echo "clipper-progress 50 200 NA"
{touch}
"#
        );
        let path = dir.join("yt-dlp");
        std::fs::write(&path, script).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path.display().to_string()
    }

    #[cfg(unix)]
    async fn run_fake(writes_file: bool) -> (tempfile::TempDir, Vec<DownloadEvent>) {
        let bin = tempfile::tempdir().unwrap();
        let work = tempfile::tempdir().unwrap();
        let ytdlp = fake_ytdlp(bin.path(), writes_file);
        let (tx, mut rx) = unbounded_channel();
        spawn_download("https://youtu.be/abc".into(), work.path().to_path_buf(), opts(&ytdlp), tx).await;
        let mut events = Vec::new();
        while let Some(ev) = rx.recv().await {
            events.push(ev);
        }
        (work, events)
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn progress_lines_then_finished() {
        let (work, events) = run_fake(true).await;
        let path = work.path().join("Cat.mp4").canonicalize().unwrap();
        assert_eq!(
            events,
            vec![
                DownloadEvent::Metadata { title: "Cat".into(), duration: 9, thumbnail: None },
                DownloadEvent::Progress(25),
                DownloadEvent::Progress(100),
                DownloadEvent::Finished { path, duration: 9 },
            ]
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn missing_merged_file_fails_once() {
        let (_work, events) = run_fake(false).await;
        assert_eq!(events.len(), 3, "{:?}", events);
        assert!(matches!(events[0], DownloadEvent::Metadata { .. }));
        assert_eq!(events[1], DownloadEvent::Progress(25));
        match &events[2] {
            DownloadEvent::Failed(msg) => assert!(msg.contains(".mp4 not found"), "{}", msg),
            other => panic!("unexpected event {:?}", other),
        }
    }
}
