/// Prefix of the lines yt-dlp prints through our `--progress-template`.
pub const PROGRESS_PREFIX: &str = "clipper-progress";

/// yt-dlp template producing `clipper-progress <downloaded> <total> <estimate>`.
pub fn progress_template() -> String {
    format!(
        "download:{} %(progress.downloaded_bytes)s %(progress.total_bytes)s %(progress.total_bytes_estimate)s",
        PROGRESS_PREFIX
    )
}

/// Integer percentage of `downloaded` over `total`, or `None` when the total
/// is unknown.
pub fn percent(downloaded: u64, total: u64) -> Option<u8> {
    if total == 0 {
        return None;
    }
    let pct = downloaded.saturating_mul(100) / total;
    Some(pct.min(100) as u8)
}

/// Parses one stdout line produced by [`progress_template`].
///
/// yt-dlp prints `NA` for fields it does not know; the exact total wins over
/// the estimate.
pub fn parse_progress_from_line(line: &str) -> Option<u8> {
    let rest = line.trim().strip_prefix(PROGRESS_PREFIX)?;
    let mut fields = rest.split_whitespace().map(parse_bytes);
    let downloaded = fields.next()??;
    let total = fields.next().flatten();
    let estimate = fields.next().flatten();
    percent(downloaded, total.or(estimate)?)
}

fn parse_bytes(field: &str) -> Option<u64> {
    let v = field.parse::<f64>().ok()?;
    (v.is_finite() && v >= 0.0).then_some(v as u64)
}
