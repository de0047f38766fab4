//! Progress Frame Stack and Progress Coordinator.
//!
//! A [`ProgressContext`] lives for one pipeline execution and is handed to every
//! stage at construction; each progress-aware stage owns one
//! [`ProgressCoordinator`], which owns one frame on the context's stack.

mod context;
mod coordinator;
mod counters;
mod frame;
mod scenario;
mod stack;
mod token;
mod writer;

pub use context::{CounterLink, ProgressContext};
pub use coordinator::ProgressCoordinator;
pub use counters::{SharedCounters, StageCounters};
pub use frame::{ProgressFrame, RecordType, DEFAULT_ACTIVITY, DEFAULT_DESCRIPTION};
pub use scenario::{Scenario, StageClassification};
pub use stack::{FrameKey, FrameStack};
pub use token::{parse_counter_token, CounterToken};
pub use writer::{NullWriter, ProgressWriter, RecordingWriter};
