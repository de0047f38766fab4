use std::cell::RefCell;
use std::io::Write;

use stagewise_core::progress::{ProgressFrame, ProgressWriter};

/// One plain line per progress write, for terminals without cursor control.
pub struct TextWriter {
    out: RefCell<Box<dyn Write>>,
}

impl TextWriter {
    pub fn new(out: Box<dyn Write>) -> Self {
        Self {
            out: RefCell::new(out),
        }
    }

    pub fn stderr() -> Self {
        Self::new(Box::new(std::io::stderr()))
    }

    fn format_frame(frame: &ProgressFrame) -> String {
        if frame.is_completed() {
            return format!("[{}] {}: done", frame.activity_id, frame.activity);
        }

        let mut line = format!(
            "[{}] {}: {}",
            frame.activity_id, frame.activity, frame.status_description
        );
        if let Some(percent) = frame.percent_complete {
            line.push_str(&format!(" ({percent}%)"));
        }
        if let Some(op) = &frame.current_operation {
            line.push_str(&format!(" - {op}"));
        }
        line
    }
}

impl ProgressWriter for TextWriter {
    fn name(&self) -> &str {
        "text"
    }

    fn write(&self, frame: &ProgressFrame) {
        let line = Self::format_frame(frame);
        if let Err(err) = writeln!(self.out.borrow_mut(), "{line}") {
            tracing::warn!(error = %err, "failed to write progress line");
        }
    }
}
