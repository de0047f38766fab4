use std::collections::VecDeque;

use stagewise_core::error::PipelineError;
use stagewise_core::host::PipelineItem;
use stagewise_core::pipeline::{Emit, Stage};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectMode {
    First(usize),
    /// Buffers until the end of input.
    Last(usize),
}

/// Third-party stage keeping the first or last `n` items.
pub struct SelectStage {
    mode: SelectMode,
    seen: usize,
    tail: VecDeque<PipelineItem>,
}

impl SelectStage {
    pub fn new(mode: SelectMode) -> Self {
        Self {
            mode,
            seen: 0,
            tail: VecDeque::new(),
        }
    }
}

impl Stage for SelectStage {
    fn command(&self) -> &str {
        "select"
    }

    fn parameters(&self) -> Vec<String> {
        match self.mode {
            SelectMode::First(_) => vec!["first".to_string()],
            SelectMode::Last(_) => vec!["last".to_string()],
        }
    }

    fn process(&mut self, item: PipelineItem, emit: &mut Emit<'_>) -> Result<(), PipelineError> {
        match self.mode {
            SelectMode::First(n) => {
                self.seen += 1;
                if self.seen <= n {
                    emit(item)?;
                }
            }
            SelectMode::Last(n) => {
                self.tail.push_back(item);
                if self.tail.len() > n {
                    self.tail.pop_front();
                }
            }
        }
        Ok(())
    }

    fn end(&mut self, emit: &mut Emit<'_>) -> Result<(), PipelineError> {
        while let Some(item) = self.tail.pop_front() {
            emit(item)?;
        }
        Ok(())
    }
}
