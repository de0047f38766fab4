//! Reference synchronous pipeline host.

mod runner;
mod runtime;
mod stage;

pub use runner::{AbortSignal, Pipeline, PipelineInput, PipelineRunner};
pub use runtime::PipelineRuntime;
pub use stage::{Emit, Stage, StageContext};
