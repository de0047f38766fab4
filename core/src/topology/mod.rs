//! Stage Topology Service
//!
//! Pure queries over the introspected stage list, relative to the querying stage.
//! When the querying stage cannot be placed in the pipeline every up/downstream
//! query answers `false`/`None`, so missing topology degrades to "no progress".

mod policy;

pub use policy::StagePolicy;

use std::rc::Rc;

use crate::host::StageHandle;
use crate::introspect::Introspector;

pub struct StageTopology<'a> {
    introspector: &'a Introspector,
    policy: &'a StagePolicy,
    stages: Rc<[StageHandle]>,
    ordinal: Option<usize>,
}

impl<'a> StageTopology<'a> {
    pub fn new(introspector: &'a Introspector, policy: &'a StagePolicy) -> Self {
        let stages = introspector
            .degrade(introspector.pipeline_stages())
            .unwrap_or_else(|| Rc::from(Vec::new()));
        let ordinal = introspector.ordinal();

        Self {
            introspector,
            policy,
            stages,
            ordinal,
        }
    }

    pub fn ordinal(&self) -> Option<usize> {
        self.ordinal
    }

    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }

    pub fn current_stage(&self) -> Option<&StageHandle> {
        self.stages.get(self.ordinal?)
    }

    pub fn is_first(&self) -> bool {
        self.ordinal == Some(0)
    }

    pub fn is_last(&self) -> bool {
        if self.ordinal.is_none() {
            return false;
        }
        matches!(
            self.introspector.degrade(self.introspector.downstream_stage()),
            Some(None)
        )
    }

    pub fn first_stage(&self) -> Option<&StageHandle> {
        self.ordinal?;
        self.stages.first()
    }

    /// Immediate upstream neighbour.
    pub fn upstream_stage(&self) -> Option<&StageHandle> {
        self.upstream().last()
    }

    pub fn has_upstream_of_kind(&self, command: &str) -> bool {
        self.upstream().iter().any(|s| s.is_command(command))
    }

    pub fn has_downstream_of_kind(&self, command: &str) -> bool {
        self.downstream().iter().any(|s| s.is_command(command))
    }

    /// Nearest progress-aware stage before this one.
    pub fn previous_aware_stage(&self) -> Option<&StageHandle> {
        self.upstream().iter().rev().find(|s| s.progress_aware)
    }

    /// Nearest progress-aware stage after this one.
    pub fn next_aware_stage(&self) -> Option<&StageHandle> {
        self.downstream().iter().find(|s| s.progress_aware)
    }

    /// True if an aware stage is reached before any stage that is neither aware nor
    /// pass-through. False when no aware stage follows.
    pub fn is_pure_to_next_aware_stage(&self) -> bool {
        for stage in self.downstream() {
            if stage.progress_aware {
                return true;
            }
            if !self.policy.is_pass_through(stage) {
                return false;
            }
        }
        false
    }

    /// True if every stage before this one is aware or pass-through.
    pub fn is_pure_from_head(&self) -> bool {
        if self.ordinal.is_none() {
            return false;
        }
        self.upstream()
            .iter()
            .all(|s| s.progress_aware || self.policy.is_pass_through(s))
    }

    /// True if a buffering or reordering stage sits between this stage and the next
    /// aware stage (or the end of the pipeline).
    pub fn has_blocking_terminal_stage(&self) -> bool {
        for stage in self.downstream() {
            if stage.progress_aware {
                return false;
            }
            if self.policy.is_blocking(stage) {
                return true;
            }
        }
        false
    }

    fn upstream(&self) -> &[StageHandle] {
        match self.ordinal {
            Some(ordinal) => &self.stages[..ordinal],
            None => &[],
        }
    }

    fn downstream(&self) -> &[StageHandle] {
        match self.ordinal {
            Some(ordinal) => &self.stages[ordinal + 1..],
            None => &[],
        }
    }
}
