use stagewise_core::error::PipelineError;
use stagewise_core::host::PipelineItem;
use stagewise_core::pipeline::{Emit, Stage};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Parity {
    Even,
    Odd,
}

/// Third-party filter keeping numbers of one parity.
pub struct WhereStage {
    parity: Parity,
}

impl WhereStage {
    pub fn new(parity: Parity) -> Self {
        Self { parity }
    }
}

impl Stage for WhereStage {
    fn command(&self) -> &str {
        "where"
    }

    fn parameters(&self) -> Vec<String> {
        let name = match self.parity {
            Parity::Even => "even",
            Parity::Odd => "odd",
        };
        vec![name.to_string()]
    }

    fn process(&mut self, item: PipelineItem, emit: &mut Emit<'_>) -> Result<(), PipelineError> {
        let keep = match (item.value().as_i64(), self.parity) {
            (Some(n), Parity::Even) => n % 2 == 0,
            (Some(n), Parity::Odd) => n % 2 != 0,
            (None, _) => false,
        };
        if keep {
            emit(item)?;
        }
        Ok(())
    }
}
