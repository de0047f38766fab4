use std::fmt;

use serde::Serialize;

use crate::introspect::Introspector;
use crate::topology::StageTopology;

/// How a stage's progress is rendered, fixed at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Scenario {
    NoProgress,
    MultipleStages,
    VariableToSingleStage,
    VariableToMultipleStages,
}

impl Scenario {
    pub fn classify(chained: bool, collection_fed_multi: bool) -> Self {
        match (chained, collection_fed_multi) {
            (true, true) => Self::VariableToMultipleStages,
            (true, false) => Self::MultipleStages,
            (false, true) => Self::VariableToSingleStage,
            (false, false) => Self::NoProgress,
        }
    }

    pub fn is_collection_fed(self) -> bool {
        matches!(
            self,
            Self::VariableToSingleStage | Self::VariableToMultipleStages
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::NoProgress => "no-progress",
            Self::MultipleStages => "multiple-stages",
            Self::VariableToSingleStage => "variable-to-single-stage",
            Self::VariableToMultipleStages => "variable-to-multiple-stages",
        }
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The two inputs of the scenario table and its result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StageClassification {
    pub chained: bool,
    pub collection_fed_multi: bool,
    pub scenario: Scenario,
}

impl StageClassification {
    pub fn disabled() -> Self {
        Self {
            chained: false,
            collection_fed_multi: false,
            scenario: Scenario::NoProgress,
        }
    }

    /// Classify the querying stage. An unplaceable stage or a disabled switch
    /// yields `NoProgress`.
    pub fn evaluate(topology: &StageTopology<'_>, introspector: &Introspector, enabled: bool) -> Self {
        if !enabled || topology.ordinal().is_none() {
            return Self::disabled();
        }

        let feeds_aware_stage =
            topology.is_pure_to_next_aware_stage() && !topology.has_blocking_terminal_stage();
        let chained = feeds_aware_stage || topology.previous_aware_stage().is_some();
        let collection_fed_multi = introspector
            .degrade(introspector.pipeline_input())
            .is_some_and(|input| input.is_multi());

        Self {
            chained,
            collection_fed_multi,
            scenario: Scenario::classify(chained, collection_fed_multi),
        }
    }
}
