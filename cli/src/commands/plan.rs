//! `stagewise plan`: print each stage's topology and scenario without running anything.
use std::io::Write;

use stagewise_core::api::{AppConfig, CliError, PipelineInput};
use stagewise_plugins::factory::build_pipeline;
use stagewise_plugins::plan::{describe, parse_pipeline, StageReport};

use crate::commands::cli::PlanArgs;

pub fn handle_plan(args: PlanArgs, cfg: &AppConfig) -> Result<i32, CliError> {
    let specs = parse_pipeline(&args.expr)?;
    let pipeline = build_pipeline(&specs, PipelineInput::None, None)?;
    let reports = describe(pipeline.handles(), args.items, &cfg.progress);

    let mut out = std::io::stdout().lock();
    if args.json {
        for report in &reports {
            let line = serde_json::to_string(report)
                .map_err(|e| CliError::Command(format!("serialize plan failed: {e}")))?;
            writeln!(out, "{line}")?;
        }
    } else {
        out.write_all(render_table(&reports).as_bytes())?;
    }
    Ok(0)
}

pub fn render_table(reports: &[StageReport]) -> String {
    fn flag(value: bool) -> &'static str {
        if value {
            "yes"
        } else {
            "-"
        }
    }

    let mut table = format!(
        "{:>3}  {:<10} {:<6} {:<6} {:<6} {:<5} {:<6} {:<9} {}\n",
        "id", "command", "aware", "first", "last", "next", "pure", "blocking", "scenario"
    );
    for report in reports {
        let next = report
            .next_aware
            .map_or_else(|| "-".to_string(), |id| id.to_string());
        let scenario = report
            .scenario
            .map_or_else(|| "-".to_string(), |s| s.to_string());
        table.push_str(&format!(
            "{:>3}  {:<10} {:<6} {:<6} {:<6} {:<5} {:<6} {:<9} {}\n",
            report.id.to_string(),
            report.command,
            flag(report.aware),
            flag(report.first),
            flag(report.last),
            next,
            flag(report.pure_to_next_aware),
            flag(report.blocking),
            scenario
        ));
    }
    table
}
