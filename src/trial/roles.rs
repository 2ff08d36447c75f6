//! Actor role classification
//!
//! Classifies the actors connected to a session into roles from their
//! declared class names. The classification is a stateless lookup performed
//! once at session start; the resulting [`Roster`] is read-only for the
//! trial's lifetime.

use serde::{Deserialize, Serialize};

use super::error::{RoleError, RoleResult};

/// Actor class name declaring the primary role
pub const PRIMARY_ACTOR_CLASS: &str = "primary";

/// Actor class name declaring the supervisor role
pub const SUPERVISOR_ACTOR_CLASS: &str = "supervisor";

/// Role of a connected actor within a trial
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActorRole {
    /// The actor whose action is ordinarily applied and which receives rewards
    Primary,
    /// Privileged actor whose submitted action overrides the primary's
    Supervisor,
    /// Any other participant: receives broadcasts, its actions are inert
    Other,
}

/// Raw actor metadata as reported by the session transport
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActorMetadata {
    /// Unique actor name within the session
    pub name: String,
    /// Declared actor class name
    pub class_name: String,
}

impl ActorMetadata {
    /// Convenience constructor
    pub fn new(name: impl Into<String>, class_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            class_name: class_name.into(),
        }
    }
}

/// A classified actor reference, immutable once the trial starts
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActorRef {
    /// Ordinal position among connected actors, stable for the trial
    pub index: usize,
    /// Unique actor name
    pub name: String,
    /// Classified role
    pub role: ActorRole,
}

/// The classified set of actors for one trial
#[derive(Debug, Clone)]
pub struct Roster {
    actors: Vec<ActorRef>,
    primary: usize,
    supervisor: Option<usize>,
}

impl Roster {
    /// Classify connected actors into a roster.
    ///
    /// Requires exactly one primary actor and at most one supervisor;
    /// everything else is classified [`ActorRole::Other`]. A wrong primary
    /// count is fatal: the trial cannot proceed.
    pub fn classify(metadata: &[ActorMetadata]) -> RoleResult<Self> {
        let actors: Vec<ActorRef> = metadata
            .iter()
            .enumerate()
            .map(|(index, meta)| {
                let role = match meta.class_name.as_str() {
                    PRIMARY_ACTOR_CLASS => ActorRole::Primary,
                    SUPERVISOR_ACTOR_CLASS => ActorRole::Supervisor,
                    _ => ActorRole::Other,
                };
                ActorRef {
                    index,
                    name: meta.name.clone(),
                    role,
                }
            })
            .collect();

        let primaries: Vec<usize> = actors
            .iter()
            .filter(|a| a.role == ActorRole::Primary)
            .map(|a| a.index)
            .collect();
        if primaries.len() != 1 {
            return Err(RoleError::PrimaryCount(primaries.len()));
        }

        let supervisors: Vec<usize> = actors
            .iter()
            .filter(|a| a.role == ActorRole::Supervisor)
            .map(|a| a.index)
            .collect();
        if supervisors.len() > 1 {
            return Err(RoleError::SupervisorCount(supervisors.len()));
        }

        Ok(Self {
            actors,
            primary: primaries[0],
            supervisor: supervisors.first().copied(),
        })
    }

    /// The primary actor
    pub fn primary(&self) -> &ActorRef {
        &self.actors[self.primary]
    }

    /// The supervisor actor, if one is connected
    pub fn supervisor(&self) -> Option<&ActorRef> {
        self.supervisor.map(|idx| &self.actors[idx])
    }

    /// All classified actors in connection order
    pub fn actors(&self) -> &[ActorRef] {
        &self.actors
    }

    /// Number of connected actors
    pub fn len(&self) -> usize {
        self.actors.len()
    }

    /// Whether the roster is empty (cannot happen for a classified roster)
    pub fn is_empty(&self) -> bool {
        self.actors.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta(name: &str, class: &str) -> ActorMetadata {
        ActorMetadata::new(name, class)
    }

    #[test]
    fn test_classify_primary_only() {
        let roster = Roster::classify(&[meta("alice", PRIMARY_ACTOR_CLASS)]).unwrap();
        assert_eq!(roster.primary().name, "alice");
        assert_eq!(roster.primary().index, 0);
        assert!(roster.supervisor().is_none());
    }

    #[test]
    fn test_classify_with_supervisor_and_others() {
        let roster = Roster::classify(&[
            meta("watcher", "spectator"),
            meta("alice", PRIMARY_ACTOR_CLASS),
            meta("bob", SUPERVISOR_ACTOR_CLASS),
        ])
        .unwrap();

        assert_eq!(roster.primary().index, 1);
        assert_eq!(roster.supervisor().unwrap().name, "bob");
        assert_eq!(roster.actors()[0].role, ActorRole::Other);
        assert_eq!(roster.len(), 3);
    }

    #[test]
    fn test_classify_no_primary() {
        let err = Roster::classify(&[meta("bob", SUPERVISOR_ACTOR_CLASS)]).unwrap_err();
        assert_eq!(err, RoleError::PrimaryCount(0));
    }

    #[test]
    fn test_classify_two_primaries() {
        let err = Roster::classify(&[
            meta("alice", PRIMARY_ACTOR_CLASS),
            meta("eve", PRIMARY_ACTOR_CLASS),
        ])
        .unwrap_err();
        assert_eq!(err, RoleError::PrimaryCount(2));
    }

    #[test]
    fn test_classify_two_supervisors() {
        let err = Roster::classify(&[
            meta("alice", PRIMARY_ACTOR_CLASS),
            meta("bob", SUPERVISOR_ACTOR_CLASS),
            meta("carol", SUPERVISOR_ACTOR_CLASS),
        ])
        .unwrap_err();
        assert_eq!(err, RoleError::SupervisorCount(2));
    }
}
