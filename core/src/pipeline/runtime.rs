use std::cell::RefCell;
use std::rc::Rc;

use crate::error::ProgressError;
use crate::host::{
    missing_stage, CollectionCursor, HostRuntime, InputSource, PipelineItem, StageHandle,
    CURRENT_LAYOUT_VERSION,
};

/// Live state of a running pipeline, as seen through [`HostRuntime`].
#[derive(Debug)]
pub struct PipelineRuntime {
    stages: Vec<StageHandle>,
    input: InputSource,
    current: RefCell<Vec<Option<PipelineItem>>>,
}

impl PipelineRuntime {
    pub(crate) fn new(stages: Vec<StageHandle>, input: InputSource) -> Self {
        let current = RefCell::new(vec![None; stages.len()]);
        Self {
            stages,
            input,
            current,
        }
    }

    pub fn handles(&self) -> &[StageHandle] {
        &self.stages
    }

    pub fn cursor(&self) -> Option<Rc<CollectionCursor>> {
        self.input.cursor().cloned()
    }

    pub(crate) fn enter(&self, ordinal: usize, item: &PipelineItem) {
        if let Some(slot) = self.current.borrow_mut().get_mut(ordinal) {
            *slot = Some(item.clone());
        }
    }

    pub(crate) fn leave(&self, ordinal: usize) {
        if let Some(slot) = self.current.borrow_mut().get_mut(ordinal) {
            *slot = None;
        }
    }
}

impl HostRuntime for PipelineRuntime {
    fn layout_version(&self) -> u32 {
        CURRENT_LAYOUT_VERSION
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

    fn downstream(&self, ordinal: usize) -> Result<Option<StageHandle>, ProgressError> {
        if ordinal >= self.stages.len() {
            return Err(missing_stage(ordinal));
        }
        Ok(self.stages.get(ordinal + 1).cloned())
    }
}
