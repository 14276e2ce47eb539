use chrono::NaiveDateTime;

// ============================================================================
// Constants
// ============================================================================

pub const SECS_PER_DAY: i64 = 24 * 3600;
pub const SECS_PER_HOUR: i64 = 3600;
pub const SECS_PER_MINUTE: i64 = 60;

/// Wire form of the datetime fields, matching an HTML `datetime-local` value.
pub const DATETIME_LOCAL_FMT: &str = "%Y-%m-%dT%H:%M";

const ACCEPTED_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

// ============================================================================
// Data Models
// ============================================================================

/// Start/end pair a countdown runs over. Times are local wall-clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RemainingTime {
    pub days: u64,
    pub hours: u64,
    pub minutes: u64,
    pub seconds: u64,
    pub total_seconds_remaining: u64,
    /// Signed: an inconsistent window yields a negative duration.
    pub total_duration_seconds: i64,
}

impl RemainingTime {
    /// Share of the total duration already elapsed, in `0.0..=100.0`.
    pub fn progress_percent(&self) -> f64 {
        if self.total_duration_seconds <= 0 {
            return 0.0;
        }

        let total = self.total_duration_seconds as f64;
        let elapsed = total - self.total_seconds_remaining as f64;
        (elapsed / total * 100.0).clamp(0.0, 100.0)
    }

    pub fn is_elapsed(&self) -> bool {
        self.total_seconds_remaining == 0
    }
}

// ============================================================================
// Computation
// ============================================================================

/// Breaks the time left until `end` into days, hours, minutes and seconds.
///
/// Returns `None` when either end of the window is unset. Remaining time
/// floors at zero once `now` passes `end`; the total duration is kept as-is
/// so progress can still be derived.
pub fn compute_remaining(
    start: Option<NaiveDateTime>,
    end: Option<NaiveDateTime>,
    now: NaiveDateTime,
) -> Option<RemainingTime> {
    let (start, end) = (start?, end?);

    let total_duration_seconds = floor_secs((end - start).num_milliseconds());
    let remaining = floor_secs((end - now).num_milliseconds()).max(0);

    if remaining <= 0 {
        return Some(RemainingTime {
            total_duration_seconds,
            ..RemainingTime::default()
        });
    }

    let remaining = remaining.unsigned_abs();
    Some(RemainingTime {
        days: remaining / SECS_PER_DAY as u64,
        hours: (remaining % SECS_PER_DAY as u64) / SECS_PER_HOUR as u64,
        minutes: (remaining % SECS_PER_HOUR as u64) / SECS_PER_MINUTE as u64,
        seconds: remaining % SECS_PER_MINUTE as u64,
        total_seconds_remaining: remaining,
        total_duration_seconds,
    })
}

impl TimeWindow {
    pub fn remaining_at(&self, now: NaiveDateTime) -> RemainingTime {
        compute_remaining(Some(self.start), Some(self.end), now).unwrap_or_default()
    }
}

// Rounds toward negative infinity, so -1ms is -1s rather than 0s.
fn floor_secs(millis: i64) -> i64 {
    millis.div_euclid(1000)
}

// ============================================================================
// Formatting
// ============================================================================

pub fn format_clock(remaining: &RemainingTime) -> String {
    format!(
        "{:02}:{:02}:{:02}",
        remaining.hours, remaining.minutes, remaining.seconds
    )
}

pub fn format_total_duration(total_seconds: i64) -> String {
    format!(
        "{}h {}m",
        total_seconds.div_euclid(SECS_PER_HOUR),
        total_seconds.rem_euclid(SECS_PER_HOUR) / SECS_PER_MINUTE
    )
}

pub fn format_datetime_local(dt: &NaiveDateTime) -> String {
    dt.format(DATETIME_LOCAL_FMT).to_string()
}

/// Parses a datetime field. `Ok(None)` means the field is blank.
pub fn parse_datetime_local(s: &str) -> std::result::Result<Option<NaiveDateTime>, chrono::ParseError> {
    let s = s.trim();
    if s.is_empty() {
        return Ok(None);
    }

    let mut last_err = None;
    for fmt in ACCEPTED_FORMATS {
        match NaiveDateTime::parse_from_str(s, fmt) {
            Ok(dt) => return Ok(Some(dt)),
            Err(e) => last_err = Some(e),
        }
    }

    match last_err {
        Some(e) => Err(e),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S").unwrap()
    }

    #[test]
    fn missing_endpoint_yields_none() {
        let now = at("2024-01-01T00:00:00");
        assert!(compute_remaining(None, Some(now), now).is_none());
        assert!(compute_remaining(Some(now), None, now).is_none());
        assert!(compute_remaining(None, None, now).is_none());
    }

    #[test]
    fn halfway_through_an_hour() {
        let r = compute_remaining(
            Some(at("2024-01-01T00:00:00")),
            Some(at("2024-01-01T01:00:00")),
            at("2024-01-01T00:30:00"),
        )
        .unwrap();

        assert_eq!(format_clock(&r), "00:30:00");
        assert_eq!(r.total_seconds_remaining, 1800);
        assert_eq!(r.total_duration_seconds, 3600);
        assert_eq!(r.progress_percent(), 50.0);
    }

    #[test]
    fn remaining_floors_at_zero_after_end() {
        let start = at("2024-01-01T00:00:00");
        let end = at("2024-01-01T01:00:00");

        for now in [end, at("2024-01-01T01:00:01"), at("2024-03-01T00:00:00")] {
            let r = compute_remaining(Some(start), Some(end), now).unwrap();
            assert_eq!(r.total_seconds_remaining, 0);
            assert_eq!((r.days, r.hours, r.minutes, r.seconds), (0, 0, 0, 0));
            assert_eq!(r.total_duration_seconds, 3600);
            assert!(r.is_elapsed());
            assert_eq!(r.progress_percent(), 100.0);
        }
    }

    #[test]
    fn sub_second_remainder_is_floored() {
        let start = at("2024-01-01T00:00:00");
        let end = at("2024-01-01T00:00:10");
        let now = start + chrono::Duration::milliseconds(9_500);

        let r = compute_remaining(Some(start), Some(end), now).unwrap();
        assert_eq!(r.total_seconds_remaining, 0);

        let now = start + chrono::Duration::milliseconds(8_001);
        let r = compute_remaining(Some(start), Some(end), now).unwrap();
        assert_eq!(r.total_seconds_remaining, 1);
    }

    #[test]
    fn decomposition_adds_back_up() {
        let start = at("2024-01-01T00:00:00");
        let now = at("2024-01-01T00:00:00");

        for secs in [1_i64, 59, 60, 61, 3599, 3600, 86_399, 86_400, 90_061, 1_000_000] {
            let end = now + chrono::Duration::seconds(secs);
            let r = compute_remaining(Some(start), Some(end), now).unwrap();

            assert_eq!(
                r.days * 86_400 + r.hours * 3600 + r.minutes * 60 + r.seconds,
                r.total_seconds_remaining
            );
            assert_eq!(r.total_seconds_remaining, secs as u64);
            assert!(r.hours < 24 && r.minutes < 60 && r.seconds < 60);
        }
    }

    #[test]
    fn multi_day_window_reports_days_separately() {
        let r = compute_remaining(
            Some(at("2024-01-01T00:00:00")),
            Some(at("2024-01-03T02:03:04")),
            at("2024-01-01T00:00:00"),
        )
        .unwrap();

        assert_eq!((r.days, r.hours, r.minutes, r.seconds), (2, 2, 3, 4));
        assert_eq!(format_clock(&r), "02:03:04");
    }

    #[test]
    fn computation_is_idempotent() {
        let args = (
            Some(at("2024-05-01T09:00:00")),
            Some(at("2024-05-02T09:00:00")),
            at("2024-05-01T17:42:13"),
        );
        assert_eq!(
            compute_remaining(args.0, args.1, args.2),
            compute_remaining(args.0, args.1, args.2)
        );
    }

    #[test]
    fn inverted_window_has_negative_duration_and_zero_progress() {
        let r = compute_remaining(
            Some(at("2024-01-01T02:00:00")),
            Some(at("2024-01-01T01:00:00")),
            at("2024-01-01T00:00:00"),
        )
        .unwrap();

        assert_eq!(r.total_duration_seconds, -3600);
        assert_eq!(r.total_seconds_remaining, 3600);
        assert_eq!(r.progress_percent(), 0.0);
    }

    #[test]
    fn progress_is_zero_at_start_and_clamped_before_it() {
        let window = TimeWindow {
            start: at("2024-01-01T00:00:00"),
            end: at("2024-01-01T04:00:00"),
        };

        assert_eq!(window.remaining_at(window.start).progress_percent(), 0.0);
        // Before the window opens more time remains than the window holds.
        let early = window.remaining_at(at("2023-12-31T23:00:00"));
        assert_eq!(early.progress_percent(), 0.0);
    }

    #[test]
    fn total_duration_formats_as_hours_and_minutes() {
        assert_eq!(format_total_duration(0), "0h 0m");
        assert_eq!(format_total_duration(3600), "1h 0m");
        assert_eq!(format_total_duration(8 * 3600 + 45 * 60 + 59), "8h 45m");
        assert_eq!(format_total_duration(30 * 3600), "30h 0m");
    }

    #[test]
    fn datetime_local_is_zero_padded() {
        let dt = at("2024-03-05T07:08:59");
        assert_eq!(format_datetime_local(&dt), "2024-03-05T07:08");
    }

    #[test]
    fn parse_accepts_known_shapes() {
        let expected = at("2024-03-05T07:08:00");
        assert_eq!(parse_datetime_local("2024-03-05T07:08").unwrap(), Some(expected));
        assert_eq!(parse_datetime_local(" 2024-03-05 07:08 ").unwrap(), Some(expected));
        assert_eq!(parse_datetime_local("2024-03-05T07:08:00").unwrap(), Some(expected));
        assert_eq!(parse_datetime_local("2024-03-05 07:08:00").unwrap(), Some(expected));
    }

    #[test]
    fn parse_blank_is_unset_and_garbage_is_an_error() {
        assert_eq!(parse_datetime_local("").unwrap(), None);
        assert_eq!(parse_datetime_local("   ").unwrap(), None);
        assert!(parse_datetime_local("2024-13-01T00:00").is_err());
        assert!(parse_datetime_local("2024-01-01T").is_err());
        assert!(parse_datetime_local("tomorrow").is_err());
    }
}
