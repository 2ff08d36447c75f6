//! Error types for trial execution
//!
//! Domain errors use thiserror; every variant here is fatal to its trial.
//! Anomalies that are part of normal operation (an absent reward, an actor
//! abstaining while a supervisor covers for it) are not errors.

use thiserror::Error;

/// Top-level trial error
#[derive(Debug, Error)]
pub enum TrialError {
    /// Role classification errors (pre-start)
    #[error("Role configuration error: {0}")]
    Role(#[from] RoleError),

    /// Action resolution errors (mid-trial)
    #[error("Action error: {0}")]
    Action(#[from] ActionError),

    /// Environment collaborator failures
    #[error("Environment failure: {0}")]
    Environment(#[from] EnvironmentError),

    /// Session transport failures
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),
}

/// Role classification errors
///
/// Raised before any broadcast; a trial with a bad roster never starts.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RoleError {
    /// Wrong number of primary actors (exactly one is required)
    #[error("expected exactly one primary actor, found {0}")]
    PrimaryCount(usize),

    /// More than one supervisor actor (at most one is allowed)
    #[error("expected at most one supervisor actor, found {0}")]
    SupervisorCount(usize),
}

/// Convenience result alias for role classification
pub type RoleResult<T> = std::result::Result<T, RoleError>;

/// Action resolution errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ActionError {
    /// The primary actor abstained with no supervisor override active
    #[error("primary actor '{0}' submitted no action and no override is active")]
    MissingPrimaryAction(String),
}

/// Environment collaborator errors
///
/// The environment owns simulator-internal state; any failure in its
/// reset/step/render surface aborts the trial with no observation produced
/// for that step.
#[derive(Debug, Error)]
pub enum EnvironmentError {
    /// Reset failed
    #[error("reset failed: {0}")]
    Reset(String),

    /// Step failed
    #[error("step failed: {0}")]
    Step(String),

    /// Render failed
    #[error("render failed: {0}")]
    Render(String),
}

/// Convenience result alias for environment operations
pub type EnvResult<T> = std::result::Result<T, EnvironmentError>;

/// Session transport errors
#[derive(Debug, Error)]
pub enum TransportError {
    /// The session was closed before the trial finished
    #[error("session closed")]
    Closed,

    /// Outbound dispatch failed
    #[error("dispatch failed: {0}")]
    Dispatch(String),
}

/// Result type using TrialError
pub type Result<T> = std::result::Result<T, TrialError>;
