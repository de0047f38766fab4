//! Host-side model of a running pipeline and the query trait hosts implement.

mod fixed;
mod runtime;
mod types;

pub use fixed::FixedHost;
pub use runtime::{HostRuntime, CURRENT_LAYOUT_VERSION, SUPPORTED_LAYOUT_VERSIONS};
pub(crate) use runtime::missing_stage;
pub use types::{CollectionCursor, InputSource, PipelineItem, StageHandle, StageId};
