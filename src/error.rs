//! # Engine Error Types
//!
//! Structured error handling for the orchestration engine using thiserror.
//! Every failure mode is a distinct variant so callers can branch on the
//! error kind instead of parsing messages.

use thiserror::Error;

/// Errors raised by the workflow orchestration engine.
///
/// All variants are fatal to the call that raised them: the engine performs
/// no internal retries and never rolls back partial progress. Idempotent
/// re-invocation is the recovery path.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// A lifecycle operation was invoked while the instance was in a state
    /// that does not permit it. The instance is left unchanged.
    #[error("State violation: {message}")]
    StateViolation { message: String },

    /// An entity lookup came back empty where the caller required a hit.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// An activity insertion targeted a position the default chain cannot
    /// accept.
    #[error("Invalid position {position} for workflow definition {workflow_definition_id}: {message}")]
    InvalidPosition {
        workflow_definition_id: i64,
        position: i32,
        message: String,
    },

    /// The instance pointer moved between the caller's read and the decision
    /// save. The caller must re-read the instance and retry.
    #[error("Concurrent workflow modification on instance {instance_id}")]
    ConcurrencyConflict { instance_id: i64 },

    /// A single-decision query was issued against a multiple-approval
    /// activity, or vice versa.
    #[error("Multiplicity mismatch on activity definition {activity_definition_id}: {message}")]
    MultiplicityMismatch {
        activity_definition_id: i64,
        message: String,
    },

    /// The advancement gate is not satisfied for the current activity.
    #[error("Cannot advance workflow instance {instance_id}: approval requirement not satisfied")]
    AdvancementDenied { instance_id: i64 },

    /// A caller-side precondition failed (for example creating an entity
    /// that already carries an id).
    #[error("Validation error: {message}")]
    Validation { message: String },
}

impl EngineError {
    /// Create a state violation error
    pub fn state_violation(message: impl Into<String>) -> Self {
        Self::StateViolation {
            message: message.into(),
        }
    }

    /// Create a not-found error for the given entity kind and id
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Check whether this error signals a misconfigured definition rather
    /// than a runtime condition
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            Self::NotFound { .. } | Self::InvalidPosition { .. } | Self::Validation { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;
