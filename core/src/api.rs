//! Stable re-exports for consumers (`cli`, `plugins`, and external hosts).
//!
//! Prefer importing from `stagewise_core::api` instead of reaching into internal modules.

pub use crate::config::{
    load_default, load_from_path, AppConfig, BlockingRule, LoggingConfig, ProgressConfig,
    WriterKind,
};
pub use crate::error::{CliError, PipelineError, ProgressError};
pub use crate::host::{
    CollectionCursor, FixedHost, HostRuntime, InputSource, PipelineItem, StageHandle, StageId,
};
pub use crate::introspect::Introspector;
pub use crate::pipeline::{
    AbortSignal, Emit, Pipeline, PipelineInput, PipelineRunner, PipelineRuntime, Stage,
    StageContext,
};
pub use crate::progress::{
    ProgressContext, ProgressCoordinator, ProgressFrame, ProgressWriter, RecordType,
    RecordingWriter, Scenario, StageClassification,
};
pub use crate::topology::{StagePolicy, StageTopology};
