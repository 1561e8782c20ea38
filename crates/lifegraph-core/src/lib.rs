//! Pure domain logic for the Lifegraph activity tracker.
//!
//! Nothing in this crate touches the database or the network. The storage
//! and HTTP layers call into it for every decision that has to be made the
//! same way everywhere: how a timestamp is parsed and stored, where a day or
//! a year begins and ends, which submissions are accepted, and how long the
//! current streak is.
//!
//! # Day boundary
//!
//! All calendar arithmetic uses UTC. The "today" count, the streak, and
//! the year filter all agree on where one day ends and the next begins.
//!
//! # Modules
//!
//! - [`timestamp`] -- Lenient parsing and the fixed-width storage encoding
//! - [`calendar`] -- UTC year and day ranges
//! - [`validate`] -- Submission validation
//! - [`streak`] -- Current-streak computation

pub mod calendar;
pub mod streak;
pub mod timestamp;
pub mod validate;

pub use calendar::{CalendarError, DayRange, YearRange, today_utc};
pub use streak::{STREAK_LOOKBACK_DAYS, current_streak};
pub use timestamp::TimestampError;
pub use validate::{Rejection, validate_submission};
