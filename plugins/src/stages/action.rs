use std::time::Duration;

use stagewise_core::error::PipelineError;
use stagewise_core::host::PipelineItem;
use stagewise_core::pipeline::{Emit, Stage, StageContext};
use stagewise_core::progress::ProgressCoordinator;

use super::pause;

/// Short per-item action that reports on its parent's bar instead of its own.
pub struct ActionStage {
    delay: Option<Duration>,
    progress: Option<ProgressCoordinator>,
}

impl ActionStage {
    pub fn new(delay: Option<Duration>) -> Self {
        Self {
            delay,
            progress: None,
        }
    }
}

impl Stage for ActionStage {
    fn command(&self) -> &str {
        "action"
    }

    fn progress_aware(&self) -> bool {
        true
    }

    fn begin(&mut self, ctx: &StageContext) -> Result<(), PipelineError> {
        self.progress = Some(ctx.coordinator("Performing action"));
        Ok(())
    }

    fn process(&mut self, item: PipelineItem, emit: &mut Emit<'_>) -> Result<(), PipelineError> {
        let Some(progress) = self.progress.as_mut() else {
            return Err(PipelineError::stage("action", "process called before begin"));
        };

        progress.overwrite_upstream_frame("Performing action", format!("Acting on item {item}"))?;
        pause(self.delay);

        emit(item)?;
        progress.complete()?;
        Ok(())
    }
}
