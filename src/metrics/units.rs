//! Human-readable formatting for byte counts and durations.

/// Marker rendered for quantities that could not be measured.
pub const UNAVAILABLE: &str = "n/a";

const BYTE_UNITS: [&str; 6] = ["KB", "MB", "GB", "TB", "PB", "EB"];

/// Format a byte count using the largest power-of-1024 unit that keeps the
/// scaled value below 1024, with two decimals.
///
/// Negative counts signal an unmeasured quantity and render as [`UNAVAILABLE`]
/// rather than a fabricated number. Counts below 1 KiB render as integer
/// bytes with a `B` suffix.
pub fn format_bytes(bytes: i64) -> String {
    if bytes < 0 {
        return UNAVAILABLE.to_string();
    }
    if bytes < 1024 {
        return format!("{} B", bytes);
    }

    let mut value = bytes as f64 / 1024.0;
    let mut unit = 0;
    while value >= 1024.0 && unit + 1 < BYTE_UNITS.len() {
        value /= 1024.0;
        unit += 1;
    }

    format!("{:.2} {}", value, BYTE_UNITS[unit])
}

/// Decompose a second count into days, hours, minutes and seconds.
///
/// Each sub-day component stays within its base (hours < 24, minutes and
/// seconds < 60); multi-day spans accumulate in the day count, so no input
/// overflows.
pub fn format_duration(secs: u64) -> String {
    let days = secs / 86_400;
    let hours = (secs % 86_400) / 3_600;
    let minutes = (secs % 3_600) / 60;
    let seconds = secs % 60;

    format!("{} days, {} h {} m {} s", days, hours, minutes, seconds)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bytes_below_one_kib_stay_integral() {
        assert_eq!(format_bytes(0), "0 B");
        assert_eq!(format_bytes(1), "1 B");
        assert_eq!(format_bytes(1023), "1023 B");
    }

    #[test]
    fn bytes_scale_to_largest_unit() {
        assert_eq!(format_bytes(1024), "1.00 KB");
        assert_eq!(format_bytes(1536), "1.50 KB");
        assert_eq!(format_bytes(1024 * 1024), "1.00 MB");
        assert_eq!(format_bytes(5 * 1024 * 1024 * 1024), "5.00 GB");
        assert_eq!(format_bytes(1024_i64.pow(4)), "1.00 TB");
    }

    #[test]
    fn negative_bytes_are_unavailable() {
        assert_eq!(format_bytes(-1), UNAVAILABLE);
        assert_eq!(format_bytes(i64::MIN), UNAVAILABLE);
    }

    #[test]
    fn huge_counts_saturate_at_the_largest_unit() {
        assert!(format_bytes(i64::MAX).ends_with("EB"));
    }

    #[test]
    fn duration_decomposes_into_fixed_order_components() {
        assert_eq!(format_duration(0), "0 days, 0 h 0 m 0 s");
        assert_eq!(format_duration(3661), "0 days, 1 h 1 m 1 s");
        assert_eq!(format_duration(86_400 + 3_600 + 60 + 1), "1 days, 1 h 1 m 1 s");
    }

    #[test]
    fn duration_components_stay_within_base() {
        // 2 days, 23 h 59 m 59 s
        let secs = 2 * 86_400 + 23 * 3_600 + 59 * 60 + 59;
        assert_eq!(format_duration(secs), "2 days, 23 h 59 m 59 s");
    }

    #[test]
    fn duration_handles_extreme_spans_without_overflow() {
        let rendered = format_duration(u64::MAX);
        assert!(rendered.contains("days"));
    }
}
