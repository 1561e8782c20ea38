//! Submission validation.
//!
//! A submission becomes a [`NewEvent`] only if it names a non-empty source
//! and carries a parseable timestamp. Anything else is rejected. Rejected
//! submissions are counted the same as duplicates by the ingestion
//! pipeline and never reach the store.

use lifegraph_types::{EventSubmission, NewEvent};

use crate::timestamp::{TimestampError, parse_timestamp};

/// Why a submission was not accepted.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Rejection {
    /// `source` was absent or empty.
    #[error("missing source")]
    MissingSource,

    /// `timestamp` was absent.
    #[error("missing timestamp")]
    MissingTimestamp,

    /// `timestamp` could not be parsed.
    #[error(transparent)]
    InvalidTimestamp(#[from] TimestampError),
}

/// Turn a raw submission into an insertable event.
///
/// Only emptiness is checked for `source`; surrounding whitespace is kept
/// as submitted. `metadata` is passed through untouched.
pub fn validate_submission(submission: EventSubmission) -> Result<NewEvent, Rejection> {
    let source = submission
        .source
        .filter(|s| !s.is_empty())
        .ok_or(Rejection::MissingSource)?;
    let raw_ts = submission.timestamp.ok_or(Rejection::MissingTimestamp)?;
    let timestamp = parse_timestamp(&raw_ts)?;

    Ok(NewEvent {
        source,
        context: submission.context.unwrap_or_default(),
        timestamp,
        metadata: submission.metadata,
    })
}
