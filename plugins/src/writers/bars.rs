use std::cell::RefCell;
use std::collections::HashMap;

use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};
use stagewise_core::progress::{ProgressFrame, ProgressWriter};

/// Terminal progress bars, one per activity id, nested under their parent's bar.
pub struct BarWriter {
    multi: MultiProgress,
    bars: RefCell<HashMap<u32, Bar>>,
}

struct Bar {
    bar: ProgressBar,
    depth: usize,
}

impl BarWriter {
    pub fn new() -> Self {
        Self::with_multi(MultiProgress::new())
    }

    /// Bars that are tracked but never drawn.
    pub fn hidden() -> Self {
        Self::with_multi(MultiProgress::with_draw_target(ProgressDrawTarget::hidden()))
    }

    fn with_multi(multi: MultiProgress) -> Self {
        Self {
            multi,
            bars: RefCell::new(HashMap::new()),
        }
    }

    pub fn bar_count(&self) -> usize {
        self.bars.borrow().len()
    }

    pub fn depth_of(&self, activity_id: u32) -> Option<usize> {
        self.bars.borrow().get(&activity_id).map(|b| b.depth)
    }

    pub fn message_of(&self, activity_id: u32) -> Option<String> {
        self.bars
            .borrow()
            .get(&activity_id)
            .map(|b| b.bar.message().to_string())
    }

    pub fn position_of(&self, activity_id: u32) -> Option<u64> {
        self.bars.borrow().get(&activity_id).map(|b| b.bar.position())
    }

    fn style() -> ProgressStyle {
        ProgressStyle::default_bar()
            .template("{prefix}{msg:<50} [{bar:30.cyan/blue}] {pos:>3}%")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▓▒░  ")
    }

    fn message(frame: &ProgressFrame) -> String {
        match &frame.current_operation {
            Some(op) => format!("{}: {} ({})", frame.activity, frame.status_description, op),
            None => format!("{}: {}", frame.activity, frame.status_description),
        }
    }

    fn open(&self, bars: &mut HashMap<u32, Bar>, frame: &ProgressFrame) -> ProgressBar {
        let parent = frame.parent_activity_id.and_then(|id| bars.get(&id));
        let depth = parent.map_or(0, |p| p.depth + 1);

        let bar = ProgressBar::new(100);
        let bar = match parent {
            Some(parent) => self.multi.insert_after(&parent.bar, bar),
            None => self.multi.add(bar),
        };
        bar.set_style(Self::style());
        bar.set_prefix("  ".repeat(depth));

        bars.insert(
            frame.activity_id,
            Bar {
                bar: bar.clone(),
                depth,
            },
        );
        bar
    }
}

impl Default for BarWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressWriter for BarWriter {
    fn name(&self) -> &str {
        "bars"
    }

    fn write(&self, frame: &ProgressFrame) {
        let mut bars = self.bars.borrow_mut();

        if frame.is_completed() {
            if let Some(closed) = bars.remove(&frame.activity_id) {
                closed.bar.finish_and_clear();
                self.multi.remove(&closed.bar);
            }
            return;
        }

        let bar = match bars.get(&frame.activity_id) {
            Some(existing) => existing.bar.clone(),
            None => self.open(&mut bars, frame),
        };
        bar.set_message(Self::message(frame));
        bar.set_position(u64::from(frame.percent_complete.unwrap_or(0)));
    }
}

impl Drop for BarWriter {
    fn drop(&mut self) {
        for (_, open) in self.bars.get_mut().drain() {
            open.bar.finish_and_clear();
        }
    }
}
