//! Action events flowing from the session transport into the engine
//!
//! One [`ActionEvent`] corresponds to one step of the trial: the set of
//! per-actor action messages collected by the transport, plus the
//! protocol-level signal telling the engine whether the session is still
//! active.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Protocol-level signal carried by every event, independent of the
/// engine's own termination decision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventKind {
    /// The session is active; the trial continues unless the environment ends it
    Active,
    /// The transport signals this is the last step it will serve
    LastStep,
    /// The session has been ended at the protocol level
    Ended,
}

/// A single actor's action message for one step
///
/// `value: None` means the actor abstained this step. For the primary actor
/// abstention is a protocol violation unless a supervisor override is active.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionMessage {
    /// Ordinal index of the submitting actor
    pub actor_index: usize,
    /// Structured action payload; `None` when the actor abstained
    pub value: Option<Value>,
}

impl ActionMessage {
    /// An action message carrying a payload
    pub fn present(actor_index: usize, value: Value) -> Self {
        Self {
            actor_index,
            value: Some(value),
        }
    }

    /// An abstention
    pub fn absent(actor_index: usize) -> Self {
        Self {
            actor_index,
            value: None,
        }
    }

    /// Whether a payload was submitted
    pub fn is_present(&self) -> bool {
        self.value.is_some()
    }
}

/// One inbound event from the session transport
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionEvent {
    /// Protocol-level session signal
    pub kind: EventKind,
    /// Per-actor action messages collected for this step; may be empty for
    /// purely administrative events
    pub actions: Vec<ActionMessage>,
}

impl ActionEvent {
    /// An active event carrying the given actions
    pub fn active(actions: Vec<ActionMessage>) -> Self {
        Self {
            kind: EventKind::Active,
            actions,
        }
    }

    /// A termination-request event, optionally carrying final actions
    pub fn last_step(actions: Vec<ActionMessage>) -> Self {
        Self {
            kind: EventKind::LastStep,
            actions,
        }
    }

    /// A protocol-level session-ended event; carries no actions
    pub fn ended() -> Self {
        Self {
            kind: EventKind::Ended,
            actions: Vec::new(),
        }
    }

    /// The action message for a given actor index, if one was collected
    pub fn action_for(&self, actor_index: usize) -> Option<&ActionMessage> {
        self.actions.iter().find(|a| a.actor_index == actor_index)
    }
}
