#![allow(dead_code)]

use std::rc::Rc;

use stagewise_core::config::ProgressConfig;
use stagewise_core::error::PipelineError;
use stagewise_core::host::PipelineItem;
use stagewise_core::pipeline::{
    AbortSignal, Emit, Pipeline, PipelineInput, PipelineRunner, Stage, StageContext,
};
use stagewise_core::progress::{ProgressContext, ProgressCoordinator, RecordingWriter};

pub fn items(n: i64) -> Vec<PipelineItem> {
    (1..=n).map(PipelineItem::from).collect()
}

/// Route coordinator diagnostics to the test harness; `RUST_LOG=trace` shows every write.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn recording_context() -> (Rc<RecordingWriter>, Rc<ProgressContext>) {
    init_tracing();
    let writer = Rc::new(RecordingWriter::new());
    let ctx = ProgressContext::new(writer.clone(), &ProgressConfig::default());
    (writer, ctx)
}

pub fn run(
    ctx: &Rc<ProgressContext>,
    input: PipelineInput,
    stages: Vec<Box<dyn Stage>>,
    abort: &AbortSignal,
) -> Result<Vec<PipelineItem>, PipelineError> {
    PipelineRunner::new(Pipeline::new(input, stages), ctx.clone())?.run(abort)
}

/// Aware stage passing every item through, counting it on the way.
pub struct Tracked {
    activity: String,
    description: String,
    progress: Option<ProgressCoordinator>,
    abort_after: Option<(AbortSignal, usize)>,
    skip_start: bool,
    seen: usize,
}

impl Tracked {
    pub fn new(activity: &str, description: &str) -> Self {
        Self {
            activity: activity.to_string(),
            description: description.to_string(),
            progress: None,
            abort_after: None,
            skip_start: false,
            seen: 0,
        }
    }

    pub fn abort_after(mut self, signal: &AbortSignal, items: usize) -> Self {
        self.abort_after = Some((signal.clone(), items));
        self
    }

    pub fn without_start(mut self) -> Self {
        self.skip_start = true;
        self
    }

    pub fn boxed(self) -> Box<dyn Stage> {
        Box::new(self)
    }
}

impl Stage for Tracked {
    fn command(&self) -> &str {
        "tracked"
    }

    fn progress_aware(&self) -> bool {
        true
    }

    fn begin(&mut self, ctx: &StageContext) -> Result<(), PipelineError> {
        self.progress = Some(ctx.coordinator(self.activity.clone()));
        Ok(())
    }

    fn process(&mut self, item: PipelineItem, emit: &mut Emit<'_>) -> Result<(), PipelineError> {
        self.seen += 1;
        let Some(progress) = self.progress.as_mut() else {
            return emit(item);
        };

        if !self.skip_start {
            progress.start(self.description.clone())?;
        }
        progress.record_processed(&item)?;
        emit(item)?;
        progress.complete()?;

        if let Some((signal, after)) = &self.abort_after {
            if self.seen == *after {
                signal.abort();
            }
        }
        Ok(())
    }
}

/// Third-party stage keeping even numbers only.
pub struct Evens;

impl Stage for Evens {
    fn command(&self) -> &str {
        "where"
    }

    fn process(&mut self, item: PipelineItem, emit: &mut Emit<'_>) -> Result<(), PipelineError> {
        match item.value().as_i64() {
            Some(n) if n % 2 == 0 => emit(item),
            _ => Ok(()),
        }
    }
}

/// Third-party stage holding every item back until the input ends.
pub struct Hold {
    command: &'static str,
    held: Vec<PipelineItem>,
}

impl Hold {
    pub fn new(command: &'static str) -> Self {
        Self {
            command,
            held: Vec::new(),
        }
    }

    pub fn boxed(self) -> Box<dyn Stage> {
        Box::new(self)
    }
}

impl Stage for Hold {
    fn command(&self) -> &str {
        self.command
    }

    fn process(&mut self, item: PipelineItem, _emit: &mut Emit<'_>) -> Result<(), PipelineError> {
        self.held.push(item);
        Ok(())
    }

    fn end(&mut self, emit: &mut Emit<'_>) -> Result<(), PipelineError> {
        for item in self.held.drain(..) {
            emit(item)?;
        }
        Ok(())
    }
}
