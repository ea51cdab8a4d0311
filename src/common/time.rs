//! Classic Mac OS (HFS) timestamps.
//!
//! Alias records store dates as seconds since 1904-01-01 00:00:00 UTC, and
//! optionally a "high resolution" 48.16 fixed-point variant of the same value.

use chrono::{DateTime, TimeZone, Utc};

/// Seconds between the HFS epoch (1904-01-01) and the Unix epoch.
pub const HFS_EPOCH_OFFSET: i64 = 2_082_844_800;

/// Convert a timestamp to 32-bit HFS seconds, clamped to the representable range.
pub fn to_hfs_seconds<T: Into<DateTime<Utc>>>(time: T) -> u32 {
    let secs = time.into().timestamp() + HFS_EPOCH_OFFSET;
    secs.clamp(0, u32::MAX as i64) as u32
}

/// Convert a timestamp to the 48.16 fixed-point form used by alias extras.
pub fn to_hfs_high_res<T: Into<DateTime<Utc>>>(time: T) -> u64 {
    let dt = time.into();
    let secs = (dt.timestamp() + HFS_EPOCH_OFFSET).max(0) as u64;
    let frac = (u64::from(dt.timestamp_subsec_nanos()) << 16) / 1_000_000_000;
    (secs << 16) | frac
}

/// Interpret 32-bit HFS seconds as a UTC timestamp.
pub fn from_hfs_seconds(secs: u32) -> Option<DateTime<Utc>> {
    Utc.timestamp_opt(i64::from(secs) - HFS_EPOCH_OFFSET, 0)
        .single()
}
