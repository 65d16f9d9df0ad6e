//! # Shared Types Crate
//!
//! This crate contains all domain entities exchanged between the orchestrator
//! subsystems (registry, selection, dispatch, verification, scoring, rewards).
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: All cross-subsystem types are defined here.
//! - **Attributed responses**: Every `ResponseRecord` is already attributed to a
//!   miner identity by the transport layer; nothing here re-verifies signatures.
//! - **Immutable outcomes**: `ConsensusResult` and `RewardInstruction` are
//!   produced once and never mutated.

pub mod entities;
pub mod errors;
pub mod time;

pub use entities::*;
pub use errors::*;
pub use time::{SystemTimeSource, TimeSource};
