use serde::{Deserialize, Serialize};

/// Placeholder activity of a frame no stage has started yet.
pub const DEFAULT_ACTIVITY: &str = "Activity";
/// Placeholder status of a frame no stage has started yet.
pub const DEFAULT_DESCRIPTION: &str = "Description";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordType {
    #[default]
    Processing,
    Completed,
}

/// One nested progress display unit, as handed to the host's progress primitive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressFrame {
    pub activity_id: u32,
    pub parent_activity_id: Option<u32>,
    pub activity: String,
    pub status_description: String,
    pub current_operation: Option<String>,
    pub percent_complete: Option<u8>,
    pub record_type: RecordType,
}

impl ProgressFrame {
    pub fn new(activity_id: u32, parent_activity_id: Option<u32>) -> Self {
        Self {
            activity_id,
            parent_activity_id,
            activity: DEFAULT_ACTIVITY.to_string(),
            status_description: DEFAULT_DESCRIPTION.to_string(),
            current_operation: None,
            percent_complete: None,
            record_type: RecordType::Processing,
        }
    }

    /// Both activity and status have left their placeholders.
    pub fn is_initialized(&self) -> bool {
        self.activity != DEFAULT_ACTIVITY && self.status_description != DEFAULT_DESCRIPTION
    }

    pub fn is_completed(&self) -> bool {
        self.record_type == RecordType::Completed
    }

    /// Back to placeholders, keeping the frame's identity.
    pub fn reset(&mut self) {
        *self = Self::new(self.activity_id, self.parent_activity_id);
    }

    /// Take over every field of `other`, identity included.
    pub fn assume_identity_of(&mut self, other: &ProgressFrame) {
        self.clone_from(other);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_frame_is_uninitialized() {
        let mut frame = ProgressFrame::new(2, Some(1));
        assert!(!frame.is_initialized());

        frame.activity = "Retrieving probes".into();
        assert!(!frame.is_initialized());

        frame.status_description = "Retrieving all probes".into();
        assert!(frame.is_initialized());
    }

    #[test]
    fn test_reset_keeps_identity() {
        let mut frame = ProgressFrame::new(3, Some(2));
        frame.activity = "Cloning".into();
        frame.percent_complete = Some(40);
        frame.record_type = RecordType::Completed;

        frame.reset();
        assert_eq!(frame, ProgressFrame::new(3, Some(2)));
    }
}
