use thiserror::Error;

/// Errors raised by the progress coordination layer.
///
/// Only [`ProgressError::ContractViolation`] ever reaches a stage implementation;
/// the other two variants are recovered where they are produced.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProgressError {
    #[error("contract violation on activity {activity_id}: {reason}")]
    ContractViolation { activity_id: u32, reason: String },

    #[error("host introspection unavailable: {0}")]
    IntrospectionUnavailable(String),

    #[error("malformed upstream progress state: {0}")]
    MalformedUpstreamState(String),
}

impl ProgressError {
    pub fn contract(activity_id: u32, reason: impl Into<String>) -> Self {
        Self::ContractViolation {
            activity_id,
            reason: reason.into(),
        }
    }

    /// Whether the error must terminate the invoking stage.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::ContractViolation { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_contract_violation_is_fatal() {
        assert!(ProgressError::contract(1, "uninitialized").is_fatal());
        assert!(!ProgressError::IntrospectionUnavailable("layout".into()).is_fatal());
        assert!(!ProgressError::MalformedUpstreamState("token".into()).is_fatal());
    }

    #[test]
    fn test_contract_violation_message() {
        let err = ProgressError::contract(3, "frame written before start");
        assert_eq!(
            err.to_string(),
            "contract violation on activity 3: frame written before start"
        );
    }
}
