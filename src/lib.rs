//! Proctor – a multi-actor trial execution engine for episodic environments
//!
//! This crate implements the coordination core of an episode ("trial") run
//! between a host-side environment and remote actors over an asynchronous
//! session protocol:
//! - A per-trial state machine driving reset, step, and termination
//! - Role classification of connected actors (primary, supervisor, other)
//! - Supervisor override of the primary actor's submitted actions
//! - Reward routing to the primary actor
//! - Exactly-once delivery of the final observation set
//!
//! Simulator internals, decision policies, and wire formats live behind the
//! [`env::Environment`] and [`transport::SessionTransport`] seams.

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

/// Environment collaborator contract and reference environment
pub mod env;

/// Multi-trial supervision and reporting
pub mod service;

/// Trial core: roles, events, resolver, rewards, and the execution engine
pub mod trial;

/// Session transport contract and in-process channel transport
pub mod transport;

// Re-export key types for convenience
pub use trial::{SessionConfig, Trial, TrialId, TrialReport, TrialState};

/// Current version of the proctor crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Protocol version for session-level compatibility checks
pub const PROTOCOL_VERSION: &str = "1.0.0";
