use std::cmp::Ordering;

use stagewise_core::error::PipelineError;
use stagewise_core::host::PipelineItem;
use stagewise_core::pipeline::{Emit, Stage};

/// Third-party stage that reorders its whole input.
#[derive(Default)]
pub struct SortStage {
    items: Vec<PipelineItem>,
}

impl SortStage {
    pub fn new() -> Self {
        Self::default()
    }

    fn compare(a: &PipelineItem, b: &PipelineItem) -> Ordering {
        match (a.value().as_f64(), b.value().as_f64()) {
            (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
            _ => a.to_string().cmp(&b.to_string()),
        }
    }
}

impl Stage for SortStage {
    fn command(&self) -> &str {
        "sort"
    }

    fn process(&mut self, item: PipelineItem, _emit: &mut Emit<'_>) -> Result<(), PipelineError> {
        self.items.push(item);
        Ok(())
    }

    fn end(&mut self, emit: &mut Emit<'_>) -> Result<(), PipelineError> {
        self.items.sort_by(Self::compare);
        for item in self.items.drain(..) {
            emit(item)?;
        }
        Ok(())
    }
}
