//! Sample stages: progress-aware ones that drive a coordinator, and third-party
//! ones the coordinators can only see through the host.

mod action;
mod filter;
mod generate;
mod select;
mod sort;
mod transform;

pub use action::ActionStage;
pub use filter::{Parity, WhereStage};
pub use generate::GenerateStage;
pub use select::{SelectMode, SelectStage};
pub use sort::SortStage;
pub use transform::TransformStage;

use std::time::Duration;

pub(crate) fn pause(delay: Option<Duration>) {
    if let Some(delay) = delay {
        std::thread::sleep(delay);
    }
}
