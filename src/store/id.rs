use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

use crate::util::time::now_nanos;

/// First identifier handed out by a default counter generator.
pub const DEFAULT_ID_START: u64 = 1000;

/// How identifiers are produced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IdStrategy {
    /// Decimal counter, incremented once per insert.
    #[default]
    Counter,
    /// Nanosecond wall-clock reading, bumped past the previous id when the
    /// clock has not advanced (or went backwards).
    Timestamp,
}

/// Hands out pairwise distinct identifiers.
///
/// The state lives in a single [`AtomicU64`], so a generator can be shared
/// between stores and still never repeat an id.
#[derive(Debug)]
pub struct IdGenerator {
    strategy: IdStrategy,
    /// Counter: the next id to hand out. Timestamp: the last id handed out.
    state: AtomicU64,
}

impl IdGenerator {
    /// Counter generator starting at `start`.
    pub fn counter(start: u64) -> Self {
        Self {
            strategy: IdStrategy::Counter,
            state: AtomicU64::new(start),
        }
    }

    /// Strictly monotonic timestamp generator.
    pub fn timestamp() -> Self {
        Self {
            strategy: IdStrategy::Timestamp,
            state: AtomicU64::new(0),
        }
    }

    pub fn new(strategy: IdStrategy, start: u64) -> Self {
        match strategy {
            IdStrategy::Counter => Self::counter(start),
            IdStrategy::Timestamp => Self::timestamp(),
        }
    }

    pub fn strategy(&self) -> IdStrategy {
        self.strategy
    }

    /// Produce the next identifier.
    pub fn next_id(&self) -> String {
        let raw = match self.strategy {
            IdStrategy::Counter => self.state.fetch_add(1, Ordering::Relaxed),
            IdStrategy::Timestamp => self.next_timestamp(),
        };
        raw.to_string()
    }

    fn next_timestamp(&self) -> u64 {
        let mut last = self.state.load(Ordering::Relaxed);
        loop {
            let candidate = now_nanos().max(last + 1);
            match self.state.compare_exchange_weak(
                last,
                candidate,
                Ordering::AcqRel,
                Ordering::Relaxed,
            ) {
                Ok(_) => return candidate,
                Err(actual) => last = actual,
            }
        }
    }
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::counter(DEFAULT_ID_START)
    }
}
