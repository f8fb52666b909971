use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Directory name used by confy under the platform config dir
const APP_NAME: &str = "lobster_clipper";
/// File name of the TOML config
const CONFIG_NAME: &str = "config";

/// User-tunable settings, persisted as TOML
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// yt-dlp executable, looked up on PATH unless absolute
    pub ytdlp_binary: String,
    /// ffmpeg executable, looked up on PATH unless absolute
    pub ffmpeg_binary: String,
    /// yt-dlp format selector
    pub download_format: String,
    /// Container yt-dlp merges video and audio into
    pub merge_format: String,
    /// Parallel fragment downloads for DASH/HLS sources
    pub concurrent_fragments: u32,
    /// Optional TTF/OTF file used as the UI font
    pub font_path: Option<PathBuf>,
    /// Play the splash animation on startup
    pub show_splash: bool,
    /// Folder the last clip was saved to
    pub last_save_dir: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            ytdlp_binary: "yt-dlp".to_string(),
            ffmpeg_binary: "ffmpeg".to_string(),
            download_format: "bv*[vcodec*=avc1][ext=mp4]+ba[ext=m4a]/b[ext=mp4]".to_string(),
            merge_format: "mp4".to_string(),
            concurrent_fragments: 8,
            font_path: None,
            show_splash: true,
            last_save_dir: None,
        }
    }
}

impl AppConfig {
    /// Loads the config file, falling back to defaults if it is unreadable
    pub fn load() -> Self {
        match confy::load::<AppConfig>(APP_NAME, Some(CONFIG_NAME)) {
            Ok(cfg) => {
                log::debug!("Loaded config: {:?}", cfg);
                cfg
            }
            Err(e) => {
                log::warn!("Failed to load config, using defaults: {}", e);
                Self::default()
            }
        }
    }

    pub fn store(&self) -> anyhow::Result<()> {
        confy::store(APP_NAME, Some(CONFIG_NAME), self)?;
        Ok(())
    }
}
