//! Current-streak computation.
//!
//! The streak walks the most recent active days backwards from today. A
//! day is counted when it equals the expected day or the day before it,
//! and the expected day then moves to the day before the counted one.
//!
//! The one-day tolerance applies at every step, not only when today has
//! no activity yet. A single missed day anywhere in the run is skipped
//! over without ending the streak; only two consecutive missed days end
//! it. Events today and two days ago therefore give a streak of 2.
//!
//! Active days later than the expected day (future-dated events) are
//! passed over without counting and without ending the walk.

use chrono::NaiveDate;

/// Maximum number of distinct active days examined.
pub const STREAK_LOOKBACK_DAYS: usize = 365;

/// Compute the current streak.
///
/// `active_days` must be distinct and in strictly descending order. At most
/// [`STREAK_LOOKBACK_DAYS`] of them are examined.
pub fn current_streak<I>(today: NaiveDate, active_days: I) -> u32
where
    I: IntoIterator<Item = NaiveDate>,
{
    let mut expected = today;
    let mut streak: u32 = 0;

    for day in active_days.into_iter().take(STREAK_LOOKBACK_DAYS) {
        if day == expected || Some(day) == expected.pred_opt() {
            streak = streak.saturating_add(1);
            match day.pred_opt() {
                Some(prev) => expected = prev,
                None => break,
            }
        } else if day < expected {
            break;
        }
    }

    tracing::trace!(%today, streak, "Computed current streak");
    streak
}
