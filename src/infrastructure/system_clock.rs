// Wall clock backed by the operating system
use crate::application::clock::Clock;
use chrono::{FixedOffset, Local, Offset, Utc};

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        Utc::now().timestamp_millis()
    }

    fn utc_offset(&self) -> FixedOffset {
        Local::now().offset().fix()
    }
}
