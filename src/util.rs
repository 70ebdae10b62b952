use chrono::{DateTime, Local};

pub fn expand_template(template: &str, playlist_name: &str, file_name: &str) -> String {
    template.replace("${playlist_name}", playlist_name).replace("${file_name}", file_name)
}

/// Timestamp used in per-run log file names.
pub fn run_timestamp(now: DateTime<Local>) -> String {
    now.format("%Y%m%d_%H%M%S").to_string()
}

/// Parse "3:45" or "1:02:03" into milliseconds. Values too large for a
/// `u64` count of milliseconds yield `None`.
pub fn parse_clock_duration_ms(text: &str) -> Option<u64> {
    let mut secs: u64 = 0;
    let mut parts = 0;
    for part in text.trim().split(':') {
        let n: u64 = part.parse().ok()?;
        secs = secs.checked_mul(60)?.checked_add(n)?;
        parts += 1;
    }
    if !(2..=3).contains(&parts) {
        return None;
    }
    secs.checked_mul(1000)
}
