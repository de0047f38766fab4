use std::rc::Rc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use super::runtime::PipelineRuntime;
use super::stage::{Stage, StageContext};
use crate::error::PipelineError;
use crate::host::{HostRuntime, InputSource, PipelineItem, StageHandle, StageId};
use crate::progress::ProgressContext;

/// Input handed to the first stage.
#[derive(Debug, Clone, Default)]
pub enum PipelineInput {
    /// The head stage is called once with a null item and produces its own data.
    #[default]
    None,
    /// A materialized collection, handed out one item at a time.
    Collection(Vec<PipelineItem>),
}

/// Cross-thread abort flag checked before every item.
#[derive(Debug, Clone, Default)]
pub struct AbortSignal(Arc<AtomicBool>);

impl AbortSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn abort(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_aborted(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    pub fn check(&self) -> Result<(), PipelineError> {
        if self.is_aborted() {
            Err(PipelineError::Aborted)
        } else {
            Ok(())
        }
    }
}

pub struct Pipeline {
    input: PipelineInput,
    stages: Vec<Box<dyn Stage>>,
}

impl Pipeline {
    pub fn new(input: PipelineInput, stages: Vec<Box<dyn Stage>>) -> Self {
        Self { input, stages }
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Handles of the stages, with ids assigned from 1 in pipeline order.
    pub fn handles(&self) -> Vec<StageHandle> {
        self.stages
            .iter()
            .enumerate()
            .map(|(ordinal, stage)| StageHandle {
                id: StageId(ordinal as u64 + 1),
                command: stage.command().to_string(),
                progress_aware: stage.progress_aware(),
                parameters: stage.parameters(),
            })
            .collect()
    }
}

/// Drives a [`Pipeline`] synchronously, one item at a time, depth first.
///
/// Stages are torn down in reverse order when the runner is dropped, on every
/// exit path.
pub struct PipelineRunner {
    stages: Vec<Box<dyn Stage>>,
    runtime: Rc<PipelineRuntime>,
    progress: Rc<ProgressContext>,
}

impl PipelineRunner {
    pub fn new(pipeline: Pipeline, progress: Rc<ProgressContext>) -> Result<Self, PipelineError> {
        if pipeline.is_empty() {
            return Err(PipelineError::Empty);
        }
        let handles = pipeline.handles();
        let input = match pipeline.input {
            PipelineInput::None => InputSource::Live,
            PipelineInput::Collection(items) => InputSource::collection(items),
        };

        Ok(Self {
            stages: pipeline.stages,
            runtime: Rc::new(PipelineRuntime::new(handles, input)),
            progress,
        })
    }

    pub fn runtime(&self) -> Rc<PipelineRuntime> {
        self.runtime.clone()
    }

    /// Run to completion and return what the last stage emitted.
    pub fn run(mut self, abort: &AbortSignal) -> Result<Vec<PipelineItem>, PipelineError> {
        let host: Rc<dyn HostRuntime> = self.runtime.clone();
        for (ordinal, stage) in self.stages.iter_mut().enumerate() {
            let ctx = StageContext::new(
                self.progress.clone(),
                host.clone(),
                StageId(ordinal as u64 + 1),
                ordinal,
            );
            stage.begin(&ctx)?;
        }
        tracing::debug!(stages = self.stages.len(), "pipeline started");

        let mut output = Vec::new();
        match self.runtime.cursor() {
            Some(cursor) => {
                while let Some(item) = cursor.advance() {
                    abort.check()?;
                    feed(&mut self.stages, &self.runtime, 0, item, abort, &mut output)?;
                }
            }
            None => {
                abort.check()?;
                feed(
                    &mut self.stages,
                    &self.runtime,
                    0,
                    PipelineItem::null(),
                    abort,
                    &mut output,
                )?;
            }
        }

        for ordinal in 0..self.stages.len() {
            abort.check()?;
            let (head, rest) = self.stages.split_at_mut(ordinal + 1);
            let runtime = &self.runtime;
            let output = &mut output;
            head[ordinal].end(&mut |item: PipelineItem| {
                abort.check()?;
                feed(&mut *rest, runtime, ordinal + 1, item, abort, &mut *output)
            })?;
        }

        tracing::debug!(items = output.len(), "pipeline finished");
        Ok(output)
    }
}

fn feed(
    stages: &mut [Box<dyn Stage>],
    runtime: &PipelineRuntime,
    ordinal: usize,
    item: PipelineItem,
    abort: &AbortSignal,
    output: &mut Vec<PipelineItem>,
) -> Result<(), PipelineError> {
    let Some((stage, rest)) = stages.split_first_mut() else {
        output.push(item);
        return Ok(());
    };

    runtime.enter(ordinal, &item);
    let result = stage.process(item, &mut |next: PipelineItem| {
        abort.check()?;
        feed(&mut *rest, runtime, ordinal + 1, next, abort, &mut *output)
    });
    runtime.leave(ordinal);
    result
}

impl Drop for PipelineRunner {
    fn drop(&mut self) {
        while let Some(stage) = self.stages.pop() {
            tracing::trace!(command = stage.command(), "tearing down stage");
            drop(stage);
        }
    }
}
