use crate::ports::Clock;

/// Wall clock in unix seconds.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> u32 {
        chrono::Utc::now().timestamp().clamp(0, u32::MAX as i64) as u32
    }
}
