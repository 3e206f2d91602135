//! Training backend adapters. Implement `TrainingBackend`.
//!
//! HTTP client for the real service, in-memory backend for offline runs and tests.

pub mod http_client;
pub mod memory;
pub mod wire;

pub use http_client::HttpTrainingBackend;
pub use memory::{BackendOp, MemoryBackend};
