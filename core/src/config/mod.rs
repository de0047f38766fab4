mod load;
mod types;

pub use load::{apply_env_overrides, get_stagewise_data_dir, load_default, load_from_path};
pub use types::{AppConfig, BlockingRule, LoggingConfig, ProgressConfig, WriterKind};
