use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Host-assigned identity of a running stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StageId(pub u64);

impl fmt::Display for StageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Opaque reference to a stage owned by the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageHandle {
    pub id: StageId,
    pub command: String,
    pub progress_aware: bool,
    /// Names of the parameters bound on this stage invocation.
    #[serde(default)]
    pub parameters: Vec<String>,
}

impl StageHandle {
    pub fn aware(id: u64, command: impl Into<String>) -> Self {
        Self {
            id: StageId(id),
            command: command.into(),
            progress_aware: true,
            parameters: Vec::new(),
        }
    }

    pub fn external(id: u64, command: impl Into<String>) -> Self {
        Self {
            id: StageId(id),
            command: command.into(),
            progress_aware: false,
            parameters: Vec::new(),
        }
    }

    pub fn with_parameter(mut self, name: impl Into<String>) -> Self {
        self.parameters.push(name.into());
        self
    }

    pub fn is_command(&self, command: &str) -> bool {
        self.command.eq_ignore_ascii_case(command)
    }

    pub fn has_parameter(&self, name: &str) -> bool {
        self.parameters.iter().any(|p| p.eq_ignore_ascii_case(name))
    }
}

/// One item flowing between stages. The content is opaque to progress handling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PipelineItem(Value);

impl PipelineItem {
    pub fn new(value: impl Into<Value>) -> Self {
        Self(value.into())
    }

    pub fn null() -> Self {
        Self(Value::Null)
    }

    pub fn is_null(&self) -> bool {
        self.0.is_null()
    }

    pub fn value(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }
}

impl fmt::Display for PipelineItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            Value::String(s) => f.write_str(s),
            other => write!(f, "{other}"),
        }
    }
}

impl From<Value> for PipelineItem {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

impl From<&str> for PipelineItem {
    fn from(value: &str) -> Self {
        Self(Value::from(value))
    }
}

impl From<String> for PipelineItem {
    fn from(value: String) -> Self {
        Self(Value::from(value))
    }
}

impl From<i64> for PipelineItem {
    fn from(value: i64) -> Self {
        Self(Value::from(value))
    }
}

impl From<i32> for PipelineItem {
    fn from(value: i32) -> Self {
        Self(Value::from(value))
    }
}

/// Host-owned enumerator over a materialized collection.
///
/// The host advances the cursor as it hands items to the first stage; progress
/// code only ever reads it.
#[derive(Debug)]
pub struct CollectionCursor {
    items: Vec<PipelineItem>,
    current: Cell<Option<usize>>,
}

impl CollectionCursor {
    pub fn new(items: Vec<PipelineItem>) -> Self {
        Self {
            items,
            current: Cell::new(None),
        }
    }

    pub fn total_count(&self) -> usize {
        self.items.len()
    }

    pub fn items(&self) -> &[PipelineItem] {
        &self.items
    }

    /// Index of the item most recently handed out, `None` before the first.
    pub fn current_index(&self) -> Option<usize> {
        self.current.get()
    }

    pub fn current_item(&self) -> Option<&PipelineItem> {
        self.current.get().and_then(|i| self.items.get(i))
    }

    pub fn is_at_last(&self) -> bool {
        match self.current.get() {
            Some(i) => i + 1 >= self.items.len(),
            None => self.items.is_empty(),
        }
    }

    /// Move to the next item and return it.
    pub fn advance(&self) -> Option<PipelineItem> {
        let next = self.current.get().map_or(0, |i| i + 1);
        let item = self.items.get(next)?.clone();
        self.current.set(Some(next));
        Some(item)
    }

    pub fn seek(&self, index: usize) {
        if index < self.items.len() {
            self.current.set(Some(index));
        }
    }
}

/// Where a stage's input comes from. Fixed for the stage's lifetime.
#[derive(Debug, Clone)]
pub enum InputSource {
    /// Fed item by item by an upstream stage.
    Live,
    /// Fed from a pre-computed collection.
    Materialized(Rc<CollectionCursor>),
}

impl InputSource {
    pub fn collection(items: Vec<PipelineItem>) -> Self {
        Self::Materialized(Rc::new(CollectionCursor::new(items)))
    }

    pub fn cursor(&self) -> Option<&Rc<CollectionCursor>> {
        match self {
            Self::Live => None,
            Self::Materialized(cursor) => Some(cursor),
        }
    }

    pub fn total_count(&self) -> Option<usize> {
        self.cursor().map(|c| c.total_count())
    }

    /// A materialized collection with more than one element.
    pub fn is_multi(&self) -> bool {
        self.total_count().is_some_and(|n| n > 1)
    }
}
