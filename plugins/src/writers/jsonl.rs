use std::cell::RefCell;
use std::io::Write;

use chrono::Local;
use serde_json::{json, Value};
use stagewise_core::progress::{ProgressFrame, ProgressWriter, RecordType};

/// One JSON object per progress write.
pub struct JsonlWriter {
    out: RefCell<Box<dyn Write>>,
}

impl JsonlWriter {
    pub fn new(out: Box<dyn Write>) -> Self {
        Self {
            out: RefCell::new(out),
        }
    }

    pub fn stderr() -> Self {
        Self::new(Box::new(std::io::stderr()))
    }

    fn frame_to_json(frame: &ProgressFrame) -> Value {
        let event_type = match frame.record_type {
            RecordType::Processing => "progress.update",
            RecordType::Completed => "progress.completed",
        };
        json!({
            "v": 1,
            "event_type": event_type,
            "ts": Local::now().to_rfc3339(),
            "activity_id": frame.activity_id,
            "parent_activity_id": frame.parent_activity_id,
            "activity": frame.activity,
            "status": frame.status_description,
            "current_operation": frame.current_operation,
            "percent": frame.percent_complete,
        })
    }
}

impl ProgressWriter for JsonlWriter {
    fn name(&self) -> &str {
        "jsonl"
    }

    fn write(&self, frame: &ProgressFrame) {
        let line = serde_json::to_string(&Self::frame_to_json(frame)).unwrap_or_else(|_| "{}".into());
        let mut out = self.out.borrow_mut();
        if let Err(err) = writeln!(out, "{line}").and_then(|()| out.flush()) {
            tracing::warn!(error = %err, "failed to write progress event");
        }
    }
}
