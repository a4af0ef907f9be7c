pub mod backend;
pub mod frontend;
pub mod metrics;
