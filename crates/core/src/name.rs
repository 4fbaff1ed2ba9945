//! Snapshot identifier codec.
//!
//! An identifier is `{log}_{instant}_{sequence}`: a fixed-width UTC
//! timestamp at 100 ns resolution plus a zero-padded 10-digit per-instance
//! counter. The fixed widths make lexicographic order equal chronological
//! order, then save order within one instance.

use chrono::{DateTime, NaiveDateTime, TimeDelta, Utc};

/// Seconds-precision part of the instant component.
const SECONDS_FORMAT: &str = "%Y.%m.%d_%H.%M.%S";

/// Length of the instant component: `yyyy.MM.dd_HH.mm.ss.fffffff`.
const INSTANT_LEN: usize = 27;

/// Length of the seconds-precision prefix within the instant component.
const SECONDS_LEN: usize = 19;

/// Digits in the sequence component.
const SEQUENCE_DIGITS: usize = 10;

/// Errors from interpreting snapshot identifiers.
#[derive(Debug, thiserror::Error)]
pub enum NameError {
    #[error("snapshot name {name:?} does not carry a parseable timestamp")]
    Malformed { name: String },
}

/// Build the identifier for a snapshot of `log_name` taken at `instant`
/// with the given per-instance sequence number.
pub fn build(log_name: &str, instant: DateTime<Utc>, sequence: u64) -> String {
    format!(
        "{log_name}_{}_{sequence:0width$}",
        format_instant(instant),
        width = SEQUENCE_DIGITS
    )
}

/// Recover the creation instant from an identifier of `log_name`.
///
/// Works by fixed offset arithmetic: skip the `{log_name}_` prefix, strip
/// the `_{sequence}` suffix, and parse what remains with the exact pattern
/// used to build it.
pub fn parse_instant(name: &str, log_name: &str) -> Result<DateTime<Utc>, NameError> {
    let start = log_name.len() + 1;
    let end = name.len().saturating_sub(SEQUENCE_DIGITS + 1);
    name.get(start..end)
        .and_then(parse_instant_component)
        .ok_or_else(|| NameError::Malformed {
            name: name.to_string(),
        })
}

/// Whether `candidate` is structurally a snapshot identifier of `log_name`.
///
/// Requires the exact prefix, component widths, digit positions, and a
/// timestamp that actually exists on the calendar. Used to keep unrelated
/// entries found in shared storage from being mistaken for snapshots.
pub fn matches(candidate: &str, log_name: &str) -> bool {
    let Some(rest) = candidate
        .strip_prefix(log_name)
        .and_then(|r| r.strip_prefix('_'))
    else {
        return false;
    };
    if rest.len() != INSTANT_LEN + 1 + SEQUENCE_DIGITS {
        return false;
    }
    let (instant_part, sequence_part) = rest.split_at(INSTANT_LEN);
    let Some(sequence) = sequence_part.strip_prefix('_') else {
        return false;
    };
    sequence.bytes().all(|b| b.is_ascii_digit())
        && parse_instant_component(instant_part).is_some()
}

fn format_instant(instant: DateTime<Utc>) -> String {
    let ticks = instant.timestamp_subsec_nanos() / 100;
    format!("{}.{ticks:07}", instant.format(SECONDS_FORMAT))
}

fn parse_instant_component(text: &str) -> Option<DateTime<Utc>> {
    if text.len() != INSTANT_LEN {
        return None;
    }
    let (seconds_part, fraction_part) = text.split_at(SECONDS_LEN);
    let ticks_text = fraction_part.strip_prefix('.')?;
    if !ticks_text.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let ticks: i64 = ticks_text.parse().ok()?;
    let seconds = NaiveDateTime::parse_from_str(seconds_part, SECONDS_FORMAT).ok()?;
    Some(seconds.and_utc() + TimeDelta::nanoseconds(ticks * 100))
}
