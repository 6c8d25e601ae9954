use super::types::SimTime;
use log::warn;
use std::sync::atomic::{AtomicU64, Ordering};

/// Monotonic source of simulation time
pub trait Clock: Send + Sync {
    fn now(&self) -> SimTime;
}

/// Clock advanced explicitly by the host's simulation step.
///
/// The time is stored as the bit pattern of an `f64` so it can be shared
/// between the owner and readers without locking.
#[derive(Debug)]
pub struct ManualClock {
    bits: AtomicU64,
}

impl ManualClock {
    pub fn new(start: SimTime) -> Self {
        Self {
            bits: AtomicU64::new(start.to_bits()),
        }
    }

    /// Move the clock to `time`. Moving backwards is ignored.
    pub fn set(&self, time: SimTime) {
        let current = self.now();
        if time < current {
            warn!("Ignoring clock rewind from {} to {}", current, time);
            return;
        }
        self.bits.store(time.to_bits(), Ordering::Release);
    }

    pub fn advance(&self, dt: SimTime) {
        self.set(self.now() + dt);
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new(0.0)
    }
}

impl Clock for ManualClock {
    fn now(&self) -> SimTime {
        f64::from_bits(self.bits.load(Ordering::Acquire))
    }
}
