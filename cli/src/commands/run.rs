//! `stagewise run`: drive a pipeline on a blocking thread while Ctrl-C aborts it.
use std::io::Write;
use std::rc::Rc;
use std::time::Duration;

use stagewise_core::api::{
    AbortSignal, AppConfig, CliError, PipelineItem, PipelineRunner, ProgressConfig,
    ProgressContext, ProgressWriter,
};
use stagewise_plugins::factory::{build_pipeline, build_writer, collection_input};
use stagewise_plugins::plan::parse_pipeline;

use crate::commands::cli::RunArgs;

pub async fn handle_run(args: RunArgs, mut cfg: AppConfig) -> Result<i32, CliError> {
    if args.no_progress {
        cfg.progress.enabled = false;
    }
    if let Some(format) = args.format {
        cfg.progress.writer = format.into();
    }
    let delay = (args.delay_ms > 0).then(|| Duration::from_millis(args.delay_ms));

    let abort = AbortSignal::new();
    let on_interrupt = abort.clone();
    let watcher = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("interrupt received, aborting pipeline");
            on_interrupt.abort();
        }
    });

    // Progress state is single-threaded; everything is built on the blocking thread.
    let progress = cfg.progress;
    let result = tokio::task::spawn_blocking(move || {
        let writer = build_writer(progress.writer);
        execute(&args.expr, args.items, delay, &progress, writer, &abort)
    })
    .await
    .map_err(|e| CliError::Command(format!("pipeline task failed: {e}")));
    watcher.abort();

    let items = result??;
    let mut out = std::io::stdout().lock();
    for item in &items {
        writeln!(out, "{item}")?;
    }
    Ok(0)
}

/// Parse, build and run `expr` to completion, returning what the last stage emitted.
pub fn execute(
    expr: &str,
    items: Option<usize>,
    delay: Option<Duration>,
    progress: &ProgressConfig,
    writer: Rc<dyn ProgressWriter>,
    abort: &AbortSignal,
) -> Result<Vec<PipelineItem>, CliError> {
    let specs = parse_pipeline(expr)?;
    let pipeline = build_pipeline(&specs, collection_input(items), delay)?;
    let ctx = ProgressContext::new(writer, progress);

    tracing::debug!(
        stages = pipeline.len(),
        writer = ctx.writer_name(),
        enabled = ctx.enabled(),
        "running pipeline"
    );

    let runner = PipelineRunner::new(pipeline, ctx)?;
    Ok(runner.run(abort)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use stagewise_core::api::{PipelineError, RecordingWriter};

    fn numbers(values: &[i64]) -> Vec<PipelineItem> {
        values.iter().copied().map(PipelineItem::from).collect()
    }

    #[test]
    fn test_execute_returns_final_items() {
        let writer = Rc::new(RecordingWriter::new());
        let items = execute(
            "generate 3 | where odd | transform",
            None,
            None,
            &ProgressConfig::default(),
            writer.clone(),
            &AbortSignal::new(),
        )
        .unwrap();

        assert_eq!(items, numbers(&[2, 6]));
        assert!(!writer.is_empty());
    }

    #[test]
    fn test_execute_without_progress_writes_nothing() {
        let writer = Rc::new(RecordingWriter::new());
        let cfg = ProgressConfig {
            enabled: false,
            ..ProgressConfig::default()
        };
        let items = execute(
            "transform | action",
            Some(2),
            None,
            &cfg,
            writer.clone(),
            &AbortSignal::new(),
        )
        .unwrap();

        assert_eq!(items, numbers(&[2, 4]));
        assert!(writer.is_empty());
    }

    #[test]
    fn test_execute_reports_abort_and_bad_stages() {
        let abort = AbortSignal::new();
        abort.abort();
        let writer: Rc<dyn ProgressWriter> = Rc::new(RecordingWriter::new());
        let cfg = ProgressConfig::default();

        let aborted = execute("transform", Some(3), None, &cfg, writer.clone(), &abort);
        assert!(matches!(
            aborted,
            Err(CliError::Pipeline(PipelineError::Aborted))
        ));

        let invalid = execute("frobnicate", None, None, &cfg, writer, &AbortSignal::new());
        assert!(matches!(
            invalid,
            Err(CliError::Pipeline(PipelineError::InvalidStage(_)))
        ));
    }
}
