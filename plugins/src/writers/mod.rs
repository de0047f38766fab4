mod bars;
mod jsonl;
mod text;

pub use bars::BarWriter;
pub use jsonl::JsonlWriter;
pub use text::TextWriter;
