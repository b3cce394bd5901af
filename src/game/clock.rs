//! Time sources and per-snake step deadlines.
//!
//! The engine never reads the wall clock itself. Everything is expressed as a
//! [`Duration`] since some origin, supplied by a [`Clock`].

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Source of the current simulation time
pub trait Clock: Send + Sync {
    fn now(&self) -> Duration;
}

/// Monotonic clock measured from its creation
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// Clock that only moves when told to
#[derive(Debug, Default)]
pub struct ManualClock {
    millis: AtomicU64,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, by: Duration) {
        self.millis.fetch_add(by.as_millis() as u64, Ordering::SeqCst);
    }

    pub fn set(&self, at: Duration) {
        self.millis.store(at.as_millis() as u64, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        Duration::from_millis(self.millis.load(Ordering::SeqCst))
    }
}

/// Next-step deadline for every snake slot
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StepSchedule {
    deadlines: Vec<Duration>,
}

impl StepSchedule {
    /// Arm each slot one interval after `now`
    pub fn start(now: Duration, intervals: impl IntoIterator<Item = Duration>) -> Self {
        Self {
            deadlines: intervals.into_iter().map(|interval| now + interval).collect(),
        }
    }

    pub fn is_due(&self, slot: usize, now: Duration) -> bool {
        self.deadlines
            .get(slot)
            .is_some_and(|deadline| now >= *deadline)
    }

    pub fn arm(&mut self, slot: usize, at: Duration) {
        if let Some(deadline) = self.deadlines.get_mut(slot) {
            *deadline = at;
        }
    }

    pub fn deadline(&self, slot: usize) -> Option<Duration> {
        self.deadlines.get(slot).copied()
    }

    /// Push every deadline back, used when resuming from pause
    pub fn shift(&mut self, by: Duration) {
        for deadline in &mut self.deadlines {
            *deadline += by;
        }
    }

    pub fn clear(&mut self) {
        self.deadlines.clear();
    }

    pub fn len(&self) -> usize {
        self.deadlines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.deadlines.is_empty()
    }
}
