//! stagewise-cli library, exposed for unit tests.

pub mod commands;
