//! Fixed-period cycle timer.
//!
//! The control loop polls [`CycleTimer::poll`] with the current monotonic
//! time; it fires once whenever strictly more than one period has elapsed
//! since the previous firing.  Arithmetic wraps, so a `u32` millisecond
//! counter rolling over does not stall the cycle.

#[derive(Debug, Clone)]
pub struct CycleTimer {
    period_ms: u64,
    last_fire_ms: u64,
    fired: u64,
}

impl CycleTimer {
    /// The first firing happens once `period_ms` has passed since time zero.
    pub fn new(period_ms: u32) -> Self {
        Self {
            period_ms: u64::from(period_ms),
            last_fire_ms: 0,
            fired: 0,
        }
    }

    pub fn poll(&mut self, now_ms: u64) -> bool {
        if now_ms.wrapping_sub(self.last_fire_ms) > self.period_ms {
            self.last_fire_ms = now_ms;
            self.fired += 1;
            true
        } else {
            false
        }
    }

    pub fn period_ms(&self) -> u64 {
        self.period_ms
    }

    /// Number of times the timer has fired.
    pub fn fired(&self) -> u64 {
        self.fired
    }
}
