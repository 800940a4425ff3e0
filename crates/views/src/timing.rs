//! Start-time rendering and elapsed-time formatting.

use chrono::{DateTime, TimeDelta, Utc};
use chrono_tz::Tz;

pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const TIME_FORMAT: &str = "%H:%M:%S";

/// Formatted timing fields of one execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Timing {
    pub start_date: String,
    pub start_time: String,
    pub duration: String,
    pub duration_millis: i64,
}

impl Timing {
    /// Render timing, or `None` when the execution never started.
    ///
    /// Elapsed time is measured on UTC instants so display offsets (and DST
    /// transitions) never leak into the arithmetic; `display` only affects
    /// the start date/time strings. A missing end time means "still running"
    /// and the span is measured against `now`.
    pub fn render(
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
        display: Tz,
    ) -> Option<Self> {
        let start = start?;
        let local = start.with_timezone(&display);
        let elapsed = elapsed(start, end.unwrap_or(now));
        Some(Self {
            start_date: local.format(DATE_FORMAT).to_string(),
            start_time: local.format(TIME_FORMAT).to_string(),
            duration: format_duration(elapsed),
            duration_millis: elapsed.num_milliseconds(),
        })
    }
}

/// Span between two instants, clamped at zero.
pub fn elapsed(start: DateTime<Utc>, end: DateTime<Utc>) -> TimeDelta {
    (end - start).max(TimeDelta::zero())
}

/// Format a span as `HH:MM:SS`.
///
/// The hour field is not wrapped at 24, so a job running for a day and a half
/// renders as `36:00:00`.
pub fn format_duration(span: TimeDelta) -> String {
    let secs = span.num_seconds().max(0);
    let hours = secs / 3600;
    let minutes = (secs % 3600) / 60;
    let seconds = secs % 60;
    format!("{hours:02}:{minutes:02}:{seconds:02}")
}
