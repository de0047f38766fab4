//! Planner: turns a pipeline expression into stage specs, and reports how each
//! stage of a pipeline would be classified before anything runs.
use std::rc::Rc;

use serde::Serialize;
use stagewise_core::config::ProgressConfig;
use stagewise_core::error::PipelineError;
use stagewise_core::host::{FixedHost, HostRuntime, PipelineItem, StageHandle, StageId};
use stagewise_core::introspect::Introspector;
use stagewise_core::progress::{Scenario, StageClassification};
use stagewise_core::topology::{StagePolicy, StageTopology};

/// One `command arg...` segment of a pipeline expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageSpec {
    pub command: String,
    pub args: Vec<String>,
}

/// Split `"generate 3 | where even | transform"` into stage specs.
pub fn parse_pipeline(expr: &str) -> Result<Vec<StageSpec>, PipelineError> {
    if expr.trim().is_empty() {
        return Err(PipelineError::Empty);
    }

    expr.split('|')
        .enumerate()
        .map(|(position, segment)| -> Result<StageSpec, PipelineError> {
            let mut words = segment.split_whitespace();
            let command = words.next().ok_or_else(|| {
                PipelineError::InvalidStage(format!("empty stage at position {}", position + 1))
            })?;
            Ok(StageSpec {
                command: command.to_ascii_lowercase(),
                args: words.map(str::to_string).collect(),
            })
        })
        .collect()
}

/// Static view of one stage's topology and classification.
#[derive(Debug, Clone, Serialize)]
pub struct StageReport {
    pub id: StageId,
    pub command: String,
    pub aware: bool,
    pub first: bool,
    pub last: bool,
    pub next_aware: Option<StageId>,
    pub pure_to_next_aware: bool,
    pub blocking: bool,
    /// Only aware stages are classified.
    pub scenario: Option<Scenario>,
}

/// Classify every stage of `handles` as if fed `items` materialized items.
pub fn describe(
    handles: Vec<StageHandle>,
    items: Option<usize>,
    cfg: &ProgressConfig,
) -> Vec<StageReport> {
    let mut host = FixedHost::new(handles.clone());
    if let Some(n) = items {
        host = host.with_collection((1..=n as i64).map(PipelineItem::from).collect());
    }
    let host: Rc<dyn HostRuntime> = Rc::new(host);
    let policy = StagePolicy::from_config(cfg);

    handles
        .into_iter()
        .map(|handle| {
            let introspector = Introspector::new(host.clone(), handle.id);
            let topology = StageTopology::new(&introspector, &policy);
            let scenario = handle.progress_aware.then(|| {
                StageClassification::evaluate(&topology, &introspector, cfg.enabled).scenario
            });

            StageReport {
                id: handle.id,
                aware: handle.progress_aware,
                first: topology.is_first(),
                last: topology.is_last(),
                next_aware: topology.next_aware_stage().map(|s| s.id),
                pure_to_next_aware: topology.is_pure_to_next_aware_stage(),
                blocking: topology.has_blocking_terminal_stage(),
                scenario,
                command: handle.command,
            }
        })
        .collect()
}
