//! # Integration Tests
//!
//! Cross-subsystem flows driven through `OrchestratorApi`.

mod persistence;
mod properties;
mod scenarios;
