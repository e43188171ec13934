// Wall-clock seam owned by the host
use chrono::FixedOffset;

pub trait Clock: Send + Sync {
    /// Wall-clock time in milliseconds since the Unix epoch
    fn now_millis(&self) -> i64;

    /// Offset of the device's current time zone
    fn utc_offset(&self) -> FixedOffset;
}
