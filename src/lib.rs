pub mod aggregators;
pub mod collectors;
pub mod config;
pub mod engine;
pub mod storage;
pub mod types;
pub mod utils;

pub use crate::engine::Orchestrator;
pub use crate::types::session::{AcquisitionSession, DataSource};
