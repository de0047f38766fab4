#[allow(clippy::module_inception)]
pub mod error;
pub mod pipeline;
pub mod progress;

pub use error::CliError;
pub use pipeline::PipelineError;
pub use progress::ProgressError;
