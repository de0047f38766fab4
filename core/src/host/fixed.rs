use std::cell::RefCell;
use std::rc::Rc;

use super::runtime::{missing_stage, HostRuntime, CURRENT_LAYOUT_VERSION};
use super::types::{CollectionCursor, InputSource, PipelineItem, StageHandle};
use crate::error::ProgressError;

/// A host whose stage list is fixed up front.
///
/// Useful for embedding hosts that already know their chain and for tests.
#[derive(Debug)]
pub struct FixedHost {
    stages: Vec<StageHandle>,
    input: InputSource,
    layout_version: u32,
    current: RefCell<Vec<Option<PipelineItem>>>,
}

impl FixedHost {
    pub fn new(stages: Vec<StageHandle>) -> Self {
        let current = RefCell::new(vec![None; stages.len()]);
        Self {
            stages,
            input: InputSource::Live,
            layout_version: CURRENT_LAYOUT_VERSION,
            current,
        }
    }

    pub fn with_collection(mut self, items: Vec<PipelineItem>) -> Self {
        self.input = InputSource::collection(items);
        self
    }

    pub fn with_layout_version(mut self, version: u32) -> Self {
        self.layout_version = version;
        self
    }

    pub fn cursor(&self) -> Option<Rc<CollectionCursor>> {
        self.input.cursor().cloned()
    }

    pub fn set_current(&self, ordinal: usize, item: Option<PipelineItem>) {
        if let Some(slot) = self.current.borrow_mut().get_mut(ordinal) {
            *slot = item;
        }
    }
}

impl HostRuntime for FixedHost {
    fn layout_version(&self) -> u32 {
        self.layout_version
    }

    fn stages(&self) -> Result<Vec<StageHandle>, ProgressError> {
        Ok(self.stages.clone())
    }

    fn input_source(&self, ordinal: usize) -> Result<InputSource, ProgressError> {
        match ordinal {
            0 => Ok(self.input.clone()),
            n if n < self.stages.len() => Ok(InputSource::Live),
            n => Err(missing_stage(n)),
        }
    }

    fn current_item(&self, ordinal: usize) -> Result<Option<PipelineItem>, ProgressError> {
        self.current
            .borrow()
            .get(ordinal)
            .cloned()
            .ok_or_else(|| missing_stage(ordinal))
    }
}
