//! Multi-trial supervision
//!
//! Trials are logically independent units: one engine per trial, no shared
//! mutable state between them. The [`TrialSupervisor`] runs each trial on its
//! own tokio task and keeps a registry of trial statuses for inspection while
//! runs are in flight.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tokio::task::JoinHandle;

use crate::env::Environment;
use crate::transport::SessionTransport;
use crate::trial::{Trial, TrialError, TrialId, TrialReport};

/// Status of a supervised trial
#[derive(Debug, Clone)]
pub enum TrialStatus {
    /// The trial task is still running
    Running,
    /// The trial finished and produced a report
    Completed(TrialReport),
    /// The trial aborted with a fatal error
    Failed(String),
}

/// Spawns trials as independent tasks and tracks their outcomes
#[derive(Clone, Default)]
pub struct TrialSupervisor {
    statuses: Arc<RwLock<HashMap<TrialId, TrialStatus>>>,
}

impl TrialSupervisor {
    /// Create an empty supervisor
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawn a trial on its own task.
    ///
    /// The engine keeps exclusive ownership of its environment and transport
    /// for the task's lifetime; the supervisor only records the outcome.
    pub fn spawn<E, T>(
        &self,
        trial: Trial<E, T>,
    ) -> (TrialId, JoinHandle<Result<TrialReport, TrialError>>)
    where
        E: Environment + 'static,
        T: SessionTransport + 'static,
    {
        let id = trial.id();
        self.statuses.write().insert(id, TrialStatus::Running);

        let statuses = Arc::clone(&self.statuses);
        let handle = tokio::spawn(async move {
            let result = trial.run().await;
            let status = match &result {
                Ok(report) => TrialStatus::Completed(report.clone()),
                Err(err) => TrialStatus::Failed(err.to_string()),
            };
            statuses.write().insert(id, status);
            result
        });

        (id, handle)
    }

    /// Status of a supervised trial, if known
    pub fn status(&self, id: &TrialId) -> Option<TrialStatus> {
        self.statuses.read().get(id).cloned()
    }

    /// IDs of all trials this supervisor has seen
    pub fn trial_ids(&self) -> Vec<TrialId> {
        self.statuses.read().keys().copied().collect()
    }

    /// Number of trials currently running
    pub fn running_count(&self) -> usize {
        self.statuses
            .read()
            .values()
            .filter(|status| matches!(status, TrialStatus::Running))
            .count()
    }
}

/// Await a batch of trial tasks, flattening task failures into errors.
pub async fn join_trials(
    handles: Vec<JoinHandle<Result<TrialReport, TrialError>>>,
) -> Vec<anyhow::Result<TrialReport>> {
    futures::future::join_all(handles)
        .await
        .into_iter()
        .map(|joined| -> anyhow::Result<TrialReport> { Ok(joined??) })
        .collect()
}
