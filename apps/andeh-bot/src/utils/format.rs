use std::time::Duration;

/// Render an uptime as `1h 2m 3s`.
pub fn uptime(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    let hours = secs / 3600;
    let minutes = (secs % 3600) / 60;
    let seconds = secs % 60;
    format!("{hours}h {minutes}m {seconds}s")
}
