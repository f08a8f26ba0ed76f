//! Elapsed-time display formatting.
//!
//! Three bands: seconds only under a minute, minutes and seconds under
//! an hour, hours and minutes from an hour up.

const SECS_PER_MINUTE: u64 = 60;
const SECS_PER_HOUR: u64 = 3600;

/// Format a whole number of elapsed seconds for display.
pub fn format_seconds(total: u64) -> String {
    if total < SECS_PER_MINUTE {
        format!("{total}s")
    } else if total < SECS_PER_HOUR {
        let minutes = total / SECS_PER_MINUTE;
        let seconds = total % SECS_PER_MINUTE;
        format!("{minutes}m {seconds}s")
    } else {
        let hours = total / SECS_PER_HOUR;
        let minutes = (total % SECS_PER_HOUR) / SECS_PER_MINUTE;
        format!("{hours}h {minutes}m")
    }
}

/// Lenient entry point for values arriving from untyped sources.
/// Non-finite or negative input formats as the zero duration.
pub fn format_elapsed(value: f64) -> String {
    if !value.is_finite() || value < 0.0 {
        return format_seconds(0);
    }
    format_seconds(value as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seconds_band_has_no_minute_component() {
        assert_eq!(format_seconds(0), "0s");
        assert_eq!(format_seconds(1), "1s");
        assert_eq!(format_seconds(59), "59s");
    }

    #[test]
    fn minutes_band() {
        assert_eq!(format_seconds(60), "1m 0s");
        assert_eq!(format_seconds(61), "1m 1s");
        assert_eq!(format_seconds(599), "9m 59s");
        assert_eq!(format_seconds(3599), "59m 59s");
    }

    #[test]
    fn hours_band_drops_seconds() {
        assert_eq!(format_seconds(3600), "1h 0m");
        assert_eq!(format_seconds(3661), "1h 1m");
        assert_eq!(format_seconds(7325), "2h 2m");
    }

    #[test]
    fn lenient_entry_point_matches_integer_path() {
        assert_eq!(format_elapsed(59.0), "59s");
        assert_eq!(format_elapsed(65.9), "1m 5s");
        assert_eq!(format_elapsed(3600.0), "1h 0m");
    }

    #[test]
    fn non_numeric_input_is_zero_duration() {
        assert_eq!(format_elapsed(f64::NAN), "0s");
        assert_eq!(format_elapsed(f64::INFINITY), "0s");
        assert_eq!(format_elapsed(f64::NEG_INFINITY), "0s");
        assert_eq!(format_elapsed(-1.0), "0s");
    }
}
