use crate::core::types::SimTime;

/// Render a duration as `1d2h4m12s`, dropping zero components.
/// Sub-second durations are whole milliseconds, truncated, so a delay never
/// reads as longer than it is. Anything non-positive is `0s`.
pub fn format_duration(seconds: SimTime) -> String {
    if !seconds.is_finite() || seconds <= 0.0 {
        return "0s".to_string();
    }
    if seconds < 1.0 {
        let millis = (seconds * 1_000.0 + 1e-9).floor() as u64;
        return match millis {
            0 => "<1ms".to_string(),
            ms => format!("{}ms", ms.min(999)),
        };
    }

    let total = seconds.floor() as u64;
    let days = total / 86_400;
    let hours = (total % 86_400) / 3_600;
    let minutes = (total % 3_600) / 60;
    let secs = total % 60;

    let mut out = String::new();
    if days > 0 {
        out.push_str(&format!("{}d", days));
    }
    if hours > 0 {
        out.push_str(&format!("{}h", hours));
    }
    if minutes > 0 {
        out.push_str(&format!("{}m", minutes));
    }
    if secs > 0 || out.is_empty() {
        out.push_str(&format!("{}s", secs));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(252.0), "4m12s");
        assert_eq!(format_duration(0.0), "0s");
        assert_eq!(format_duration(-3.0), "0s");
        assert_eq!(format_duration(0.25), "250ms");
        assert_eq!(format_duration(3_600.0), "1h");
        assert_eq!(format_duration(90_061.9), "1d1h1m1s");
    }

    #[test]
    fn test_sub_second_durations_truncate() {
        assert_eq!(format_duration(0.999), "999ms");
        assert_eq!(format_duration(0.9999), "999ms");
        assert_eq!(format_duration(0.001), "1ms");
        assert_eq!(format_duration(0.0004), "<1ms");
        assert_eq!(format_duration(1.0), "1s");
    }
}
