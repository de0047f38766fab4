use std::rc::Rc;
use std::time::Duration;

use stagewise_core::config::WriterKind;
use stagewise_core::error::PipelineError;
use stagewise_core::host::PipelineItem;
use stagewise_core::pipeline::{Pipeline, PipelineInput, Stage};
use stagewise_core::progress::ProgressWriter;

use crate::plan::StageSpec;
use crate::stages::{
    ActionStage, GenerateStage, Parity, SelectMode, SelectStage, SortStage, TransformStage,
    WhereStage,
};
use crate::writers::{BarWriter, JsonlWriter, TextWriter};

pub fn build_writer(kind: WriterKind) -> Rc<dyn ProgressWriter> {
    match kind {
        WriterKind::Bars => Rc::new(BarWriter::new()),
        WriterKind::Jsonl => Rc::new(JsonlWriter::stderr()),
        WriterKind::Text => Rc::new(TextWriter::stderr()),
    }
}

pub fn build_stage(spec: &StageSpec, delay: Option<Duration>) -> Result<Box<dyn Stage>, PipelineError> {
    let invalid = |usage: &str| PipelineError::InvalidStage(format!("{}: usage '{usage}'", spec.command));
    let arg = |index: usize| spec.args.get(index).map(String::as_str);

    let stage: Box<dyn Stage> = match spec.command.as_str() {
        "generate" => {
            let count = arg(0)
                .and_then(|s| s.parse::<u64>().ok())
                .ok_or_else(|| invalid("generate <count>"))?;
            Box::new(GenerateStage::new(count, delay))
        }
        "transform" => Box::new(TransformStage::new(delay)),
        "action" => Box::new(ActionStage::new(delay)),
        "where" => match arg(0) {
            Some("even") => Box::new(WhereStage::new(Parity::Even)),
            Some("odd") => Box::new(WhereStage::new(Parity::Odd)),
            _ => return Err(invalid("where even|odd")),
        },
        "select" => {
            let n = arg(1)
                .and_then(|s| s.parse::<usize>().ok())
                .ok_or_else(|| invalid("select first|last <n>"))?;
            match arg(0) {
                Some("first") => Box::new(SelectStage::new(SelectMode::First(n))),
                Some("last") => Box::new(SelectStage::new(SelectMode::Last(n))),
                _ => return Err(invalid("select first|last <n>")),
            }
        }
        "sort" => Box::new(SortStage::new()),
        other => return Err(PipelineError::InvalidStage(format!("unknown stage '{other}'"))),
    };
    Ok(stage)
}

pub fn build_pipeline(
    specs: &[StageSpec],
    input: PipelineInput,
    delay: Option<Duration>,
) -> Result<Pipeline, PipelineError> {
    let stages = specs
        .iter()
        .map(|spec| build_stage(spec, delay))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Pipeline::new(input, stages))
}

/// Materialized input of `1..=n`, or no input at all.
pub fn collection_input(items: Option<usize>) -> PipelineInput {
    match items {
        Some(n) => PipelineInput::Collection((1..=n as i64).map(PipelineItem::from).collect()),
        None => PipelineInput::None,
    }
}
