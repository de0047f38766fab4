use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub progress: ProgressConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_logging_enabled")]
    pub enabled: bool,

    /// If true, log to stderr.
    #[serde(default = "default_logging_console")]
    pub console: bool,

    /// If true, log to a file under `directory` (or OS temp dir if unset).
    #[serde(default)]
    pub file: bool,

    /// EnvFilter string, e.g. "info" or "stagewise_core=debug".
    #[serde(default = "default_logging_level")]
    pub level: String,

    /// Optional directory for log files. If empty or unset, uses OS temp dir.
    #[serde(default)]
    pub directory: Option<String>,
}

fn default_logging_enabled() -> bool {
    true
}

fn default_logging_console() -> bool {
    true
}

fn default_logging_level() -> String {
    "warn".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: default_logging_enabled(),
            console: default_logging_console(),
            file: false,
            level: default_logging_level(),
            directory: None,
        }
    }
}

/// Progress rendering settings shared by every stage of a pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressConfig {
    /// Host-level switch. When false every coordinator classifies as `NoProgress`.
    #[serde(default = "default_progress_enabled")]
    pub enabled: bool,

    /// Third-party stage commands that neither buffer nor reorder their input.
    #[serde(default = "default_pass_through")]
    pub pass_through: Vec<String>,

    /// Stages that buffer or reorder, invalidating upstream counts.
    #[serde(default = "default_blocking")]
    pub blocking: Vec<BlockingRule>,

    #[serde(default)]
    pub writer: WriterKind,
}

fn default_progress_enabled() -> bool {
    true
}

fn default_pass_through() -> Vec<String> {
    vec!["where".to_string(), "select".to_string(), "foreach".to_string()]
}

fn default_blocking() -> Vec<BlockingRule> {
    vec![
        BlockingRule {
            command: "select".to_string(),
            parameters: vec!["last".to_string(), "skip-last".to_string()],
        },
        BlockingRule {
            command: "tail".to_string(),
            parameters: Vec::new(),
        },
    ]
}

impl Default for ProgressConfig {
    fn default() -> Self {
        Self {
            enabled: default_progress_enabled(),
            pass_through: default_pass_through(),
            blocking: default_blocking(),
            writer: WriterKind::default(),
        }
    }
}

/// A stage command that holds items back. With no `parameters` the command always
/// blocks; otherwise it blocks only when one of the listed parameters is bound.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockingRule {
    pub command: String,

    #[serde(default)]
    pub parameters: Vec<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WriterKind {
    #[default]
    Bars,
    Jsonl,
    Text,
}
