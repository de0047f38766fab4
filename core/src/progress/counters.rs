use std::cell::RefCell;
use std::rc::Rc;

const NOT_STARTED: i64 = -1;

/// Truncated percentage of `done` out of `total`, capped at 100.
pub(crate) fn percent_of(done: u64, total: u64) -> u8 {
    if total == 0 {
        return 0;
    }
    (done.min(total) * 100 / total) as u8
}

/// Records-processed bookkeeping of one aware stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageCounters {
    processed: i64,
    total: Option<u64>,
}

/// Counters resolved once and shared between a stage and its downstream consumers.
pub type SharedCounters = Rc<RefCell<StageCounters>>;

impl Default for StageCounters {
    fn default() -> Self {
        Self {
            processed: NOT_STARTED,
            total: None,
        }
    }
}

impl StageCounters {
    pub fn shared() -> SharedCounters {
        Rc::new(RefCell::new(Self::default()))
    }

    /// Records processed so far, `-1` before the first one.
    pub fn processed(&self) -> i64 {
        self.processed
    }

    pub fn total(&self) -> Option<u64> {
        self.total
    }

    fn known_total(&self) -> Option<u64> {
        self.total.filter(|&t| t > 0)
    }

    /// Start a new count against `total`.
    pub fn begin(&mut self, total: u64) {
        self.processed = NOT_STARTED;
        self.total = Some(total);
    }

    /// Count one record. A no-op until the total is known.
    ///
    /// The first call moves the counter from `-1` straight to `1`.
    pub fn advance(&mut self) -> Option<u64> {
        let total = self.known_total()?;
        if self.processed < 0 {
            self.processed += 1;
        }
        self.processed = (self.processed + 1).min(total as i64);
        Some(self.processed as u64)
    }

    /// More records are expected against a known total.
    pub fn has_more(&self) -> bool {
        self.known_total()
            .is_some_and(|total| self.processed < total as i64)
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
