use super::types::{InputSource, PipelineItem, StageHandle};
use crate::error::ProgressError;

/// Layout revision of the query surface implemented by this crate's hosts.
pub const CURRENT_LAYOUT_VERSION: u32 = 1;

/// Host layouts the introspector knows how to read.
pub const SUPPORTED_LAYOUT_VERSIONS: &[u32] = &[CURRENT_LAYOUT_VERSION];

/// Read-only view of a running pipeline, exposed by the host.
///
/// Every query may fail with [`ProgressError::IntrospectionUnavailable`] when the
/// host cannot answer it. Implementations must not mutate pipeline state.
pub trait HostRuntime {
    fn layout_version(&self) -> u32;

    /// Ordered stage list, head first.
    fn stages(&self) -> Result<Vec<StageHandle>, ProgressError>;

    /// Input source of the stage at `ordinal`.
    fn input_source(&self, ordinal: usize) -> Result<InputSource, ProgressError>;

    /// Item currently being handed to the stage at `ordinal`.
    fn current_item(&self, ordinal: usize) -> Result<Option<PipelineItem>, ProgressError>;

    /// Stage receiving the output of the stage at `ordinal`.
    fn downstream(&self, ordinal: usize) -> Result<Option<StageHandle>, ProgressError> {
        Ok(self.stages()?.get(ordinal + 1).cloned())
    }
}

pub(crate) fn missing_stage(ordinal: usize) -> ProgressError {
    ProgressError::IntrospectionUnavailable(format!("no stage at position {ordinal}"))
}
