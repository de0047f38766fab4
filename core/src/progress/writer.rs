use std::cell::RefCell;

use super::frame::{ProgressFrame, RecordType};

/// The host's single progress primitive.
///
/// A frame is keyed by `activity_id`; `parent_activity_id` controls nesting and a
/// `Completed` record collapses the bar.
pub trait ProgressWriter {
    fn name(&self) -> &str;
    fn write(&self, frame: &ProgressFrame);
}

/// Discards every frame.
#[derive(Debug, Default)]
pub struct NullWriter;

impl ProgressWriter for NullWriter {
    fn name(&self) -> &str {
        "null"
    }

    fn write(&self, _frame: &ProgressFrame) {}
}

/// Keeps every frame written, in order.
#[derive(Debug, Default)]
pub struct RecordingWriter {
    frames: RefCell<Vec<ProgressFrame>>,
}

impl RecordingWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn frames(&self) -> Vec<ProgressFrame> {
        self.frames.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.frames.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.borrow().is_empty()
    }

    /// Percentages of the processing frames written for `activity_id`.
    pub fn percents_for(&self, activity_id: u32) -> Vec<u8> {
        self.frames
            .borrow()
            .iter()
            .filter(|f| f.activity_id == activity_id && f.record_type == RecordType::Processing)
            .filter_map(|f| f.percent_complete)
            .collect()
    }

    pub fn completed_count(&self, activity_id: u32) -> usize {
        self.frames
            .borrow()
            .iter()
            .filter(|f| f.activity_id == activity_id && f.is_completed())
            .count()
    }

    pub fn last_for(&self, activity_id: u32) -> Option<ProgressFrame> {
        self.frames
            .borrow()
            .iter()
            .rev()
            .find(|f| f.activity_id == activity_id)
            .cloned()
    }

    pub fn clear(&self) {
        self.frames.borrow_mut().clear();
    }
}

impl ProgressWriter for RecordingWriter {
    fn name(&self) -> &str {
        "recording"
    }

    fn write(&self, frame: &ProgressFrame) {
        self.frames.borrow_mut().push(frame.clone());
    }
}
