use thiserror::Error;

use super::progress::ProgressError;

/// Errors raised by the reference pipeline host and the stages it drives.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("stage '{stage}' failed: {message}")]
    Stage { stage: String, message: String },

    #[error("progress error: {0}")]
    Progress(#[from] ProgressError),

    #[error("invalid stage: {0}")]
    InvalidStage(String),

    #[error("pipeline has no stages")]
    Empty,

    #[error("pipeline aborted")]
    Aborted,
}

impl PipelineError {
    pub fn stage(stage: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Stage {
            stage: stage.into(),
            message: message.into(),
        }
    }
}
