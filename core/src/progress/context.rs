use std::cell::{Ref, RefCell};
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use super::counters::SharedCounters;
use super::frame::ProgressFrame;
use super::stack::{FrameKey, FrameStack};
use super::writer::ProgressWriter;
use crate::config::ProgressConfig;
use crate::error::ProgressError;
use crate::host::StageId;
use crate::topology::StagePolicy;

/// Counters a stage exposes to its downstream consumers.
#[derive(Debug, Clone)]
pub struct CounterLink {
    /// Stage that owns the counters.
    pub owner: StageId,
    pub counters: SharedCounters,
}

/// Progress state shared by every coordinator of one pipeline execution.
pub struct ProgressContext {
    writer: Rc<dyn ProgressWriter>,
    enabled: bool,
    policy: StagePolicy,
    stack: RefCell<FrameStack>,
    links: RefCell<HashMap<StageId, CounterLink>>,
}

impl ProgressContext {
    pub fn new(writer: Rc<dyn ProgressWriter>, cfg: &ProgressConfig) -> Rc<Self> {
        Rc::new(Self {
            writer,
            enabled: cfg.enabled,
            policy: StagePolicy::from_config(cfg),
            stack: RefCell::new(FrameStack::new()),
            links: RefCell::new(HashMap::new()),
        })
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn policy(&self) -> &StagePolicy {
        &self.policy
    }

    pub fn writer_name(&self) -> &str {
        self.writer.name()
    }

    pub fn stack(&self) -> Ref<'_, FrameStack> {
        self.stack.borrow()
    }

    pub fn depth(&self) -> usize {
        self.stack.borrow().depth()
    }

    pub(crate) fn push_frame(&self) -> FrameKey {
        self.stack.borrow_mut().push()
    }

    pub(crate) fn pop_frame(&self, key: FrameKey) -> Option<ProgressFrame> {
        self.stack.borrow_mut().pop(key)
    }

    pub(crate) fn frame(&self, key: FrameKey) -> Option<ProgressFrame> {
        self.stack.borrow().get(key).cloned()
    }

    pub(crate) fn parent_of(&self, key: FrameKey) -> Option<FrameKey> {
        self.stack.borrow().parent_of(key)
    }

    /// Mutate the frame owned by `key` and return a copy of the result.
    pub(crate) fn update_frame(
        &self,
        key: FrameKey,
        f: impl FnOnce(&mut ProgressFrame),
    ) -> Option<ProgressFrame> {
        let mut stack = self.stack.borrow_mut();
        let frame = stack.get_mut(key)?;
        f(frame);
        Some(frame.clone())
    }

    pub(crate) fn register_link(&self, stage: StageId, link: CounterLink) {
        self.links.borrow_mut().insert(stage, link);
    }

    pub(crate) fn unregister_link(&self, stage: StageId) {
        self.links.borrow_mut().remove(&stage);
    }

    pub fn link_of(&self, stage: StageId) -> Option<CounterLink> {
        self.links.borrow().get(&stage).cloned()
    }

    /// Hand `frame` to the writer. Placeholder frames are refused.
    pub fn write(&self, frame: &ProgressFrame) -> Result<(), ProgressError> {
        if !frame.is_initialized() {
            return Err(ProgressError::contract(
                frame.activity_id,
                "attempted to write progress on an uninitialized frame",
            ));
        }
        tracing::trace!(
            activity_id = frame.activity_id,
            percent = ?frame.percent_complete,
            record_type = ?frame.record_type,
            status = %frame.status_description,
            "write progress"
        );
        self.writer.write(frame);
        Ok(())
    }
}

impl fmt::Debug for ProgressContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProgressContext")
            .field("writer", &self.writer.name())
            .field("enabled", &self.enabled)
            .field("depth", &self.depth())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::RecordingWriter;

    #[test]
    fn test_write_refuses_placeholder_frame() {
        let writer = Rc::new(RecordingWriter::new());
        let ctx = ProgressContext::new(writer.clone(), &ProgressConfig::default());

        let key = ctx.push_frame();
        let frame = ctx.frame(key).unwrap();
        let err = ctx.write(&frame).unwrap_err();
        assert!(err.is_fatal());
        assert!(writer.is_empty());

        let frame = ctx
            .update_frame(key, |f| {
                f.activity = "Retrieving devices".into();
                f.status_description = "Retrieving all devices".into();
            })
            .unwrap();
        ctx.write(&frame).unwrap();
        assert_eq!(writer.len(), 1);
    }
}
