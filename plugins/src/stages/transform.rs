use std::time::Duration;

use stagewise_core::error::PipelineError;
use stagewise_core::host::PipelineItem;
use stagewise_core::pipeline::{Emit, Stage, StageContext};
use stagewise_core::progress::ProgressCoordinator;

use super::pause;

/// Doubles numeric items and passes everything else through, one out per in.
pub struct TransformStage {
    delay: Option<Duration>,
    progress: Option<ProgressCoordinator>,
}

impl TransformStage {
    pub fn new(delay: Option<Duration>) -> Self {
        Self {
            delay,
            progress: None,
        }
    }

    fn apply(item: PipelineItem) -> PipelineItem {
        match item.value().as_i64() {
            Some(n) => PipelineItem::from(n * 2),
            None => item,
        }
    }
}

impl Stage for TransformStage {
    fn command(&self) -> &str {
        "transform"
    }

    fn progress_aware(&self) -> bool {
        true
    }

    fn begin(&mut self, ctx: &StageContext) -> Result<(), PipelineError> {
        self.progress = Some(ctx.coordinator("Transforming items"));
        Ok(())
    }

    fn process(&mut self, item: PipelineItem, emit: &mut Emit<'_>) -> Result<(), PipelineError> {
        let Some(progress) = self.progress.as_mut() else {
            return Err(PipelineError::stage("transform", "process called before begin"));
        };

        progress.start("Transforming items")?;
        progress.record_processed(&item)?;
        progress.set_current_operation(format!("transforming {item}"))?;
        pause(self.delay);

        emit(Self::apply(item))?;
        progress.complete()?;
        Ok(())
    }
}
