use std::path::PathBuf;

/// Which page of the main window stack is visible
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Screen {
    /// URL entry and loading indicator
    Download,
    /// Preview, range selection and Trim & Save
    Trim,
}

/// Messages sent from the download worker to the UI thread
#[derive(Debug, Clone, PartialEq)]
pub enum DownloadEvent {
    /// Metadata probe finished
    Metadata {
        title: String,
        duration: u64,
        thumbnail: Option<String>,
    },
    /// Integer percentage (0 to 100)
    Progress(u8),
    /// Video and audio are muxed into a single file
    Finished { path: PathBuf, duration: u64 },
    /// Terminal failure, no retry
    Failed(String),
}

/// Messages sent from the trim worker to the UI thread
#[derive(Debug, Clone, PartialEq)]
pub enum TrimEvent {
    /// Clip written to this path
    Saved(PathBuf),
    /// Transcoder failed, with its error text
    Failed(String),
}

/// A video fetched during this GUI session
#[derive(Debug, Clone)]
pub struct DownloadSession {
    /// URL the user pasted
    pub url: String,
    /// Temporary directory holding the download
    pub dir: PathBuf,
    /// Muxed video file inside `dir`
    pub path: PathBuf,
    /// Length in whole seconds
    pub duration: u64,
}

/// Severity of a modal notice
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
}

/// A modal message box shown above the main window
#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub title: String,
    pub body: String,
}

impl Notice {
    pub fn info(title: &str, body: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Info, title: title.to_string(), body: body.into() }
    }

    pub fn warning(title: &str, body: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Warning, title: title.to_string(), body: body.into() }
    }

    pub fn error(title: &str, body: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Error, title: title.to_string(), body: body.into() }
    }
}
