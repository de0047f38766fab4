use crate::config::{BlockingRule, ProgressConfig};
use crate::host::StageHandle;

/// Which third-party stages are safe to look through and which hold items back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagePolicy {
    pass_through: Vec<String>,
    blocking: Vec<BlockingRule>,
}

impl StagePolicy {
    pub fn new(pass_through: Vec<String>, blocking: Vec<BlockingRule>) -> Self {
        Self {
            pass_through,
            blocking,
        }
    }

    pub fn from_config(cfg: &ProgressConfig) -> Self {
        Self::new(cfg.pass_through.clone(), cfg.blocking.clone())
    }

    pub fn is_pass_through(&self, stage: &StageHandle) -> bool {
        self.pass_through.iter().any(|c| stage.is_command(c))
    }

    pub fn is_blocking(&self, stage: &StageHandle) -> bool {
        self.blocking.iter().any(|rule| {
            stage.is_command(&rule.command)
                && (rule.parameters.is_empty()
                    || rule.parameters.iter().any(|p| stage.has_parameter(p)))
        })
    }
}

impl Default for StagePolicy {
    fn default() -> Self {
        Self::from_config(&ProgressConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy() {
        let policy = StagePolicy::default();

        assert!(policy.is_pass_through(&StageHandle::external(1, "where")));
        assert!(!policy.is_pass_through(&StageHandle::external(1, "sort")));

        let select_first = StageHandle::external(2, "select").with_parameter("first");
        let select_last = StageHandle::external(2, "select").with_parameter("last");
        assert!(!policy.is_blocking(&select_first));
        assert!(policy.is_blocking(&select_last));
        assert!(policy.is_blocking(&StageHandle::external(3, "tail")));
    }
}
