//! Time-based version code.
//!
//! A version code is a 32-bit value that increases with every commit as long
//! as commit dates do:
//!
//! ```text
//! | 1 unused sign bit | 8 bits major version | 23 bits minutes since epoch |
//! ```
//!
//! Each major version owns a disjoint window of codes. The 23-bit minutes
//! field runs out in December 2027; past that point encoding fails instead of
//! leaking into the major field.

use crate::error::{Result, SweVersionError};

/// 2012-01-01T00:00:00Z.
pub const EPOCH_UTC: i64 = 1_325_376_000;

/// Largest value a version code may take.
pub const MAX_VERSION_CODE: u32 = i32::MAX as u32;

/// Largest accepted major version.
pub const MAX_MAJOR_VERSION: i64 = 255;

pub const MINUTES_BITS: u32 = 23;
pub const MINUTES_MASK: u32 = (1 << MINUTES_BITS) - 1;

/// Minutes between [`EPOCH_UTC`] and `commit_timestamp_utc`, truncated toward
/// zero.
pub fn epoch_minutes(commit_timestamp_utc: i64) -> i64 {
    (commit_timestamp_utc - EPOCH_UTC) / 60
}

/// Parse a major version as it appears in the seed file.
pub fn parse_major(raw: &str) -> Result<i64> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| SweVersionError::InvalidMajorVersion(format!("not an integer: {raw:?}")))
}

/// Pack `major` and `epoch_minutes` into a version code.
pub fn version_code(major: Option<i64>, epoch_minutes: i64) -> Result<u32> {
    let major = major.ok_or_else(|| SweVersionError::InvalidMajorVersion("missing".to_string()))?;
    if !(0..=MAX_MAJOR_VERSION).contains(&major) {
        return Err(SweVersionError::InvalidMajorVersion(format!(
            "{major} is outside 0..={MAX_MAJOR_VERSION}"
        )));
    }
    if epoch_minutes < 0 {
        return Err(SweVersionError::EpochMinutesOutOfRange {
            minutes: epoch_minutes,
        });
    }

    let code = ((major as u64) << MINUTES_BITS) | epoch_minutes as u64;
    if code > u64::from(MAX_VERSION_CODE) {
        return Err(SweVersionError::VersionCodeOverflow {
            code,
            max: MAX_VERSION_CODE,
        });
    }
    if epoch_minutes > i64::from(MINUTES_MASK) {
        return Err(SweVersionError::EpochMinutesOutOfRange {
            minutes: epoch_minutes,
        });
    }

    Ok(code as u32)
}

/// Split a version code back into `(major, epoch_minutes)`.
pub fn decode(code: u32) -> (u32, u32) {
    (code >> MINUTES_BITS, code & MINUTES_MASK)
}
