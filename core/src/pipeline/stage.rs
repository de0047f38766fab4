use std::rc::Rc;

use crate::error::PipelineError;
use crate::host::{HostRuntime, PipelineItem, StageId};
use crate::progress::{ProgressContext, ProgressCoordinator};

/// Sink a stage writes its output items into. Each emitted item is processed by
/// every downstream stage before the call returns.
pub type Emit<'a> = dyn FnMut(PipelineItem) -> Result<(), PipelineError> + 'a;

/// One unit of a chained pipeline.
pub trait Stage {
    fn command(&self) -> &str;

    /// Whether the stage drives a [`ProgressCoordinator`].
    fn progress_aware(&self) -> bool {
        false
    }

    /// Names of the parameters bound on this invocation.
    fn parameters(&self) -> Vec<String> {
        Vec::new()
    }

    fn begin(&mut self, _ctx: &StageContext) -> Result<(), PipelineError> {
        Ok(())
    }

    fn process(&mut self, item: PipelineItem, emit: &mut Emit<'_>) -> Result<(), PipelineError>;

    /// Called once after the last input item; buffering stages flush here.
    fn end(&mut self, _emit: &mut Emit<'_>) -> Result<(), PipelineError> {
        Ok(())
    }
}

/// What a stage gets from the host when it begins.
#[derive(Clone)]
pub struct StageContext {
    progress: Rc<ProgressContext>,
    host: Rc<dyn HostRuntime>,
    stage: StageId,
    ordinal: usize,
}

impl StageContext {
    pub fn new(
        progress: Rc<ProgressContext>,
        host: Rc<dyn HostRuntime>,
        stage: StageId,
        ordinal: usize,
    ) -> Self {
        Self {
            progress,
            host,
            stage,
            ordinal,
        }
    }

    pub fn stage_id(&self) -> StageId {
        self.stage
    }

    pub fn ordinal(&self) -> usize {
        self.ordinal
    }

    pub fn progress(&self) -> &Rc<ProgressContext> {
        &self.progress
    }

    pub fn host(&self) -> &Rc<dyn HostRuntime> {
        &self.host
    }

    /// Coordinator for this stage, pushing its frame now.
    pub fn coordinator(&self, activity: impl Into<String>) -> ProgressCoordinator {
        ProgressCoordinator::new(
            self.progress.clone(),
            self.host.clone(),
            self.stage,
            activity,
        )
    }
}

impl std::fmt::Debug for StageContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StageContext")
            .field("stage", &self.stage)
            .field("ordinal", &self.ordinal)
            .finish_non_exhaustive()
    }
}
