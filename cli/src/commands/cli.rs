use clap::{Args as ClapArgs, Parser, Subcommand};
use stagewise_core::api::WriterKind;

#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatArg {
    Bars,
    Jsonl,
    Text,
}

impl From<FormatArg> for WriterKind {
    fn from(format: FormatArg) -> Self {
        match format {
            FormatArg::Bars => WriterKind::Bars,
            FormatArg::Jsonl => WriterKind::Jsonl,
            FormatArg::Text => WriterKind::Text,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "stagewise", version, about)]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,

    /// Read configuration from this file instead of the default locations.
    #[arg(long, global = true)]
    pub config: Option<String>,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct RunArgs {
    /// Pipeline expression, e.g. "generate 5 | where even | transform | action".
    pub expr: String,

    /// Feed the pipeline a materialized collection of 1..=N.
    #[arg(long)]
    pub items: Option<usize>,

    /// Progress renderer; overrides `progress.writer` from the config.
    #[arg(long, value_enum)]
    pub format: Option<FormatArg>,

    #[arg(long, default_value_t = false)]
    pub no_progress: bool,

    /// Pause inside sample stages so progress is visible.
    #[arg(long, default_value_t = 0)]
    pub delay_ms: u64,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct PlanArgs {
    pub expr: String,

    #[arg(long)]
    pub items: Option<usize>,

    /// Print one JSON object per stage instead of a table.
    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a pipeline with live progress. Items are printed to stdout.
    Run(RunArgs),
    /// Show how every stage of a pipeline would coordinate progress.
    Plan(PlanArgs),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_run_args() {
        let args = Args::try_parse_from([
            "stagewise",
            "run",
            "generate 3 | transform",
            "--format",
            "jsonl",
            "--delay-ms",
            "20",
        ])
        .unwrap();

        let Commands::Run(run) = args.command else {
            panic!("expected run");
        };
        assert_eq!(run.expr, "generate 3 | transform");
        assert_eq!(run.format, Some(FormatArg::Jsonl));
        assert_eq!(run.delay_ms, 20);
        assert_eq!(run.items, None);
        assert!(!run.no_progress);
    }

    #[test]
    fn test_config_is_global() {
        let args =
            Args::try_parse_from(["stagewise", "plan", "transform", "--items", "3", "--config", "x.toml"])
                .unwrap();
        assert_eq!(args.config.as_deref(), Some("x.toml"));
        assert!(matches!(args.command, Commands::Plan(PlanArgs { items: Some(3), .. })));
    }

    #[test]
    fn test_unknown_format_is_rejected() {
        assert!(Args::try_parse_from(["stagewise", "run", "transform", "--format", "html"]).is_err());
    }
}
