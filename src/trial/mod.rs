//! Trial core and public API
//!
//! This module provides the per-trial building blocks (role roster, action
//! events, observation builder, action resolver, reward router) and the
//! [`Trial`] engine that coordinates them against the environment and
//! transport collaborators.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// Submodules
pub mod engine;
pub mod error;
pub mod event;
pub mod observation;
pub mod resolver;
pub mod reward;
pub mod roles;

/// Session configuration consumed at trial start
///
/// Read-only for the trial's lifetime. `render` decides whether observations
/// carry a rendered frame at all; `render_width` is the target frame width
/// handed to the environment's renderer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Request a rendered frame with every observation
    pub render: bool,

    /// Target width (pixels) for rendered frames
    pub render_width: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            render: false,
            render_width: 256,
        }
    }
}

/// Unique identifier for one trial
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TrialId(pub Uuid);

impl TrialId {
    /// Create a new random trial ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for TrialId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TrialId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// Re-export commonly used types
pub use engine::{TerminationReason, Trial, TrialReport, TrialState};
pub use error::{ActionError, EnvironmentError, RoleError, TransportError, TrialError};
pub use event::{ActionEvent, ActionMessage, EventKind};
pub use observation::{Observation, ObservationBuilder, RenderedFrame};
pub use resolver::{Resolution, resolve};
pub use reward::{RewardEvent, RewardRouter};
pub use roles::{ActorMetadata, ActorRef, ActorRole, Roster};
