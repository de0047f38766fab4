pub mod factory;
pub mod plan;
pub mod stages;
pub mod writers;
