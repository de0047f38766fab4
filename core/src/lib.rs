pub mod api;
pub mod config;
pub mod error;
pub mod host;
pub mod introspect;
pub mod pipeline;
pub mod progress;
pub mod topology;
