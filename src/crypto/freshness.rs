//! Signature freshness enforcement (replay window).

use crate::clock::Clock;
use crate::SigwardenError;
use chrono::{DateTime, Utc};
use std::time::Duration;

/// Parse an `X-Timestamp` value (decimal unix seconds).
///
/// Example: "1739394973"
pub fn parse_unix_timestamp(value: &str) -> Result<DateTime<Utc>, SigwardenError> {
    let secs: i64 = value.parse().map_err(|e| {
        SigwardenError::MalformedTimestamp(format!("{:?} is not an integer ({})", value, e))
    })?;

    DateTime::from_timestamp(secs, 0).ok_or_else(|| {
        SigwardenError::MalformedTimestamp(format!("{} is out of range", secs))
    })
}

/// Check that a signature is not older than `max_age`.
///
/// Rejects when `now - max_age > created`. Future-dated timestamps are
/// accepted; only staleness is enforced. A window reaching past the earliest
/// representable time never expires.
///
/// # Errors
/// * `SignatureExpired` - Signature is older than `max_age`
/// * `ConfigError` - `max_age` does not fit a chrono duration
pub fn check_freshness<C: Clock + ?Sized>(
    created: DateTime<Utc>,
    max_age: Duration,
    clock: &C,
) -> Result<(), SigwardenError> {
    let max_age = chrono::Duration::from_std(max_age).map_err(|e| {
        SigwardenError::ConfigError(format!("max_signature_age out of range: {}", e))
    })?;
    let now = clock.now_utc();

    let Some(oldest) = now.checked_sub_signed(max_age) else {
        return Ok(());
    };

    if oldest > created {
        return Err(SigwardenError::SignatureExpired {
            age_seconds: (now - created).num_seconds(),
        });
    }

    Ok(())
}

/// Combined parse and check freshness.
pub fn check_timestamp_freshness<C: Clock + ?Sized>(
    timestamp_header: &str,
    max_age: Duration,
    clock: &C,
) -> Result<DateTime<Utc>, SigwardenError> {
    let created = parse_unix_timestamp(timestamp_header)?;
    check_freshness(created, max_age, clock)?;
    Ok(created)
}
