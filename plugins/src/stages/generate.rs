use std::time::Duration;

use stagewise_core::error::PipelineError;
use stagewise_core::host::PipelineItem;
use stagewise_core::pipeline::{Emit, Stage, StageContext};
use stagewise_core::progress::ProgressCoordinator;

use super::pause;

/// Emits `count` numbered items for every input item.
pub struct GenerateStage {
    count: u64,
    delay: Option<Duration>,
    progress: Option<ProgressCoordinator>,
}

impl GenerateStage {
    pub fn new(count: u64, delay: Option<Duration>) -> Self {
        Self {
            count,
            delay,
            progress: None,
        }
    }
}

impl Stage for GenerateStage {
    fn command(&self) -> &str {
        "generate"
    }

    fn progress_aware(&self) -> bool {
        true
    }

    fn begin(&mut self, ctx: &StageContext) -> Result<(), PipelineError> {
        self.progress = Some(ctx.coordinator("Generating items"));
        Ok(())
    }

    fn process(&mut self, item: PipelineItem, emit: &mut Emit<'_>) -> Result<(), PipelineError> {
        let Some(progress) = self.progress.as_mut() else {
            return Err(PipelineError::stage("generate", "process called before begin"));
        };

        let description = if item.is_null() {
            format!("Generating {} items", self.count)
        } else {
            format!("Generating {} items for {}", self.count, item)
        };
        progress.start(description)?;
        progress.set_total(self.count);

        for index in 1..=self.count {
            pause(self.delay);
            let out = PipelineItem::from(index as i64);
            progress.set_current_operation(format!("item {index}"))?;
            progress.record_processed(&out)?;
            emit(out)?;
        }

        progress.complete()?;
        Ok(())
    }
}
