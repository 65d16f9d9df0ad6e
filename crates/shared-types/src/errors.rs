//! # Error Types
//!
//! Defines error types used across subsystems.

use crate::entities::TaskStatus;
use thiserror::Error;

/// An illegal move in the task lifecycle state machine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid task transition: {from} -> {to}")]
pub struct TransitionError {
    pub from: TaskStatus,
    pub to: TaskStatus,
}

/// Failure to parse an operation kind from its wire name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown operation kind: {0}")]
pub struct ParseOperationError(pub String);
