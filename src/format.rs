use std::process::ExitStatus;

/// Characters that are not allowed in file names on at least one platform.
const INVALID: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// Turns an arbitrary video title into a file-name-safe stem.
///
/// Every forbidden character (and any control character) is replaced with
/// `-`. An empty result falls back to `clip`.
pub fn sanitize(title: &str) -> String {
    let safe: String = title
        .chars()
        .map(|c| if INVALID.contains(&c) || c.is_control() { '-' } else { c })
        .collect();
    if safe.trim().is_empty() {
        "clip".to_string()
    } else {
        safe
    }
}

/// Formats whole seconds as `HH:MM:SS`. Negative input shows as zero.
pub fn hhmmss(seconds: f64) -> String {
    let total = if seconds.is_finite() && seconds > 0.0 {
        seconds as u64
    } else {
        0
    };
    let (h, m, s) = (total / 3600, (total / 60) % 60, total % 60);
    format!("{:02}:{:02}:{:02}", h, m, s)
}

/// Error text for a failed external tool: its stderr tail, or the exit
/// status when it printed nothing.
pub fn tool_error(tool: &str, status: ExitStatus, stderr: &[u8]) -> String {
    let text = String::from_utf8_lossy(stderr);
    let lines: Vec<&str> = text.lines().map(str::trim).filter(|l| !l.is_empty()).collect();
    if lines.is_empty() {
        return format!("{} exited with {}", tool, status);
    }
    let tail = lines.len().saturating_sub(5);
    lines[tail..].join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replaces_forbidden_characters() {
        assert_eq!(sanitize(r#"a<b>c:d"e/f\g|h?i*j"#), "a-b-c-d-e-f-g-h-i-j");
        assert_eq!(sanitize("Rick Astley - Never Gonna Give You Up"), "Rick Astley - Never Gonna Give You Up");
    }

    #[test]
    fn control_characters_and_empty_titles() {
        assert_eq!(sanitize("tab\there"), "tab-here");
        assert_eq!(sanitize(""), "clip");
        assert_eq!(sanitize("   "), "clip");
    }

    #[test]
    fn formats_hours_minutes_seconds() {
        assert_eq!(hhmmss(0.0), "00:00:00");
        assert_eq!(hhmmss(65.9), "00:01:05");
        assert_eq!(hhmmss(3600.0 * 5.0 + 61.0), "05:01:01");
        assert_eq!(hhmmss(-3.0), "00:00:00");
        assert_eq!(hhmmss(f64::NAN), "00:00:00");
    }

    #[cfg(unix)]
    #[test]
    fn tool_error_prefers_stderr_tail() {
        use std::os::unix::process::ExitStatusExt;
        let status = ExitStatus::from_raw(1 << 8);
        assert_eq!(tool_error("ffmpeg", status, b"\n  bad input \n"), "bad input");
        let long = b"1\n2\n3\n4\n5\n6\n7\n";
        assert_eq!(tool_error("ffmpeg", status, long), "3\n4\n5\n6\n7");
        assert!(tool_error("ffmpeg", status, b"").starts_with("ffmpeg exited with"));
    }
}
