//! Action resolution and supervisor override precedence
//!
//! Given the per-actor action messages collected for one step, yields the
//! single effective action applied to the environment plus the set of actors
//! whose submitted action was replaced.
//!
//! Precedence, highest first:
//! 1. A connected supervisor that submitted a value: its action wins and the
//!    primary is recorded as overridden, regardless of what the primary sent.
//! 2. The primary's submitted value.
//!
//! Actions from `Other`-role actors are inert. A primary abstention with no
//! active override is a protocol violation and fatal to the trial.

use std::collections::BTreeSet;

use serde_json::Value;

use super::error::ActionError;
use super::event::ActionMessage;
use super::roles::Roster;

/// Outcome of resolving one step's actions
#[derive(Debug, Clone)]
pub struct Resolution {
    /// The single action applied to the environment this step
    pub action: Value,
    /// Names of actors whose submitted action was replaced
    pub overridden: BTreeSet<String>,
}

/// Resolve one step's action messages against the roster.
pub fn resolve(actions: &[ActionMessage], roster: &Roster) -> Result<Resolution, ActionError> {
    let find = |index: usize| actions.iter().find(|msg| msg.actor_index == index);

    let primary = roster.primary();

    if let Some(supervisor) = roster.supervisor() {
        if let Some(value) = find(supervisor.index).and_then(|msg| msg.value.as_ref()) {
            let mut overridden = BTreeSet::new();
            overridden.insert(primary.name.clone());
            return Ok(Resolution {
                action: value.clone(),
                overridden,
            });
        }
    }

    match find(primary.index).and_then(|msg| msg.value.as_ref()) {
        Some(value) => Ok(Resolution {
            action: value.clone(),
            overridden: BTreeSet::new(),
        }),
        None => Err(ActionError::MissingPrimaryAction(primary.name.clone())),
    }
}
