//! The trial execution engine
//!
//! Owns one trial's lifecycle from reset to terminal state: it drives the
//! environment collaborator, resolves per-step actions under supervisor
//! override, routes rewards, and decides continuation versus termination.
//!
//! Scheduling is single-threaded cooperative per trial: the await on the
//! inbound event channel is the sole suspension point, and everything between
//! two awaits (resolve, step, build, reward dispatch, broadcast) runs to
//! completion, so observers never see a partially applied step. Trials are
//! independent units; run as many engines in parallel as needed, each with
//! exclusive ownership of its environment and transport.

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use super::error::TrialError;
use super::event::{ActionEvent, EventKind};
use super::observation::ObservationBuilder;
use super::resolver::resolve;
use super::reward::RewardRouter;
use super::roles::Roster;
use super::{SessionConfig, TrialId};
use crate::env::Environment;
use crate::transport::{Broadcast, SessionTransport};

/// Engine-owned trial lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrialState {
    /// Constructed, initial broadcast not yet delivered
    NotStarted,
    /// Initial broadcast delivered; processing action events
    Running,
    /// A termination condition fired; final broadcast in flight
    Terminating,
    /// Absorbing: no further steps are processed
    Ended,
}

/// Why a trial reached its terminal state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TerminationReason {
    /// The environment reported the episode as done
    EnvironmentDone,
    /// Termination was requested at the protocol level
    Requested,
}

/// Summary of one completed (or abandoned) trial
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrialReport {
    /// Trial identifier
    pub trial_id: TrialId,
    /// Session protocol version the trial ran under
    pub protocol_version: String,
    /// Final engine state; `Running` means the transport went silent
    pub state: TrialState,
    /// Number of environment steps taken
    pub steps: u64,
    /// Sum of all routed rewards
    pub total_reward: f64,
    /// Termination reason, when the trial reached Ended
    pub termination: Option<TerminationReason>,
    /// When the initial broadcast was delivered
    pub started_at: Option<DateTime<Utc>>,
    /// When the trial reached its terminal state
    pub ended_at: Option<DateTime<Utc>>,
}

impl TrialReport {
    /// Write the report as pretty-printed JSON
    pub fn write_json(&self, path: &Path) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

/// One trial's execution engine
///
/// Exclusively owns the environment, the outbound transport surface, and the
/// ordered inbound event channel for the trial's lifetime. Construction
/// classifies the connected actors; a wrong primary count fails here, before
/// any broadcast.
pub struct Trial<E: Environment, T: SessionTransport> {
    id: TrialId,
    env: E,
    transport: T,
    events: mpsc::Receiver<ActionEvent>,
    roster: Roster,
    observations: ObservationBuilder,
    rewards: RewardRouter,
    state: TrialState,
    steps: u64,
    total_reward: f64,
    terminal_requested: bool,
    termination: Option<TerminationReason>,
    started_at: Option<DateTime<Utc>>,
    ended_at: Option<DateTime<Utc>>,
}

impl<E: Environment, T: SessionTransport> Trial<E, T> {
    /// Create a trial engine over the given collaborators.
    ///
    /// Fails with a role configuration error if the connected actors do not
    /// include exactly one primary and at most one supervisor.
    pub fn new(
        config: &SessionConfig,
        env: E,
        transport: T,
        events: mpsc::Receiver<ActionEvent>,
    ) -> Result<Self, TrialError> {
        let roster = Roster::classify(transport.active_actors())?;
        let rewards = RewardRouter::new(&roster.primary().name);

        Ok(Self {
            id: TrialId::new(),
            env,
            transport,
            events,
            roster,
            observations: ObservationBuilder::new(config),
            rewards,
            state: TrialState::NotStarted,
            steps: 0,
            total_reward: 0.0,
            terminal_requested: false,
            termination: None,
            started_at: None,
            ended_at: None,
        })
    }

    /// Trial identifier
    pub fn id(&self) -> TrialId {
        self.id
    }

    /// Current lifecycle state
    pub fn state(&self) -> TrialState {
        self.state
    }

    /// The classified actor roster
    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    /// Run the trial to completion.
    ///
    /// Resets the environment, delivers the initial broadcast, then processes
    /// one action event at a time until a termination condition fires, a
    /// fatal error surfaces, or the event channel closes. Channel closure
    /// while running is not an error: the engine never self-terminates on
    /// silence, and the report records the trial as still `Running`.
    pub async fn run(mut self) -> Result<TrialReport, TrialError> {
        self.start()?;

        while let Some(event) = self.events.recv().await {
            if !self.handle_event(event)? {
                break;
            }
        }

        Ok(self.report())
    }

    /// Deliver the initial (reset) broadcast and move to `Running`.
    pub fn start(&mut self) -> Result<(), TrialError> {
        let raw_state = match self.env.reset() {
            Ok(state) => state,
            Err(err) => return Err(self.fail(err)),
        };

        let observation = match self.observations.build_initial(&mut self.env, raw_state) {
            Ok(obs) => obs,
            Err(err) => return Err(self.fail(err)),
        };

        if let Err(err) = self.transport.start(vec![Broadcast::to_all(observation)]) {
            return Err(self.fail(err));
        }

        self.state = TrialState::Running;
        self.started_at = Some(Utc::now());
        tracing::info!(trial = %self.id, actors = self.roster.len(), "trial started");
        Ok(())
    }

    /// Process one inbound action event.
    ///
    /// Returns `Ok(true)` while the trial keeps running and `Ok(false)` once
    /// it has ended. Once `Ended`, further events are ignored without side
    /// effects. Fatal errors move the trial to `Ended` with no broadcast for
    /// the failed step.
    pub fn handle_event(&mut self, event: ActionEvent) -> Result<bool, TrialError> {
        if self.state == TrialState::Ended {
            return Ok(false);
        }

        // A termination request is sticky: it is honored at the next step
        // boundary even when the signaling event carried no actions.
        if event.kind != EventKind::Active {
            self.terminal_requested = true;
        }

        if event.actions.is_empty() {
            return Ok(true);
        }

        let resolution = match resolve(&event.actions, &self.roster) {
            Ok(resolution) => resolution,
            Err(err) => return Err(self.fail(err)),
        };
        if !resolution.overridden.is_empty() {
            tracing::debug!(trial = %self.id, step = self.steps, "supervisor override applied");
        }

        let step = match self.env.step(&resolution.action) {
            Ok(step) => step,
            Err(err) => return Err(self.fail(err)),
        };

        let observation =
            match self
                .observations
                .build(&mut self.env, step.state, resolution.overridden)
            {
                Ok(obs) => obs,
                Err(err) => return Err(self.fail(err)),
            };

        // Reward dispatch precedes the observation broadcast and happens
        // whether or not the trial continues.
        if let Some(reward) = self.rewards.route(step.reward) {
            self.total_reward += reward.value;
            tracing::debug!(trial = %self.id, value = reward.value, "reward dispatched");
            if let Err(err) = self.transport.add_reward(&reward) {
                return Err(self.fail(err));
            }
        }

        self.steps += 1;

        if step.done || self.terminal_requested {
            self.state = TrialState::Terminating;
            if let Err(err) = self.transport.end(vec![Broadcast::to_all(observation)]) {
                return Err(self.fail(err));
            }
            self.state = TrialState::Ended;
            self.ended_at = Some(Utc::now());
            self.termination = Some(if step.done {
                TerminationReason::EnvironmentDone
            } else {
                TerminationReason::Requested
            });
            tracing::info!(
                trial = %self.id,
                steps = self.steps,
                reason = ?self.termination,
                "trial ended"
            );
            Ok(false)
        } else {
            if let Err(err) = self
                .transport
                .produce_observations(vec![Broadcast::to_all(observation)])
            {
                return Err(self.fail(err));
            }
            Ok(true)
        }
    }

    /// Summarize the trial in its current state.
    pub fn report(&self) -> TrialReport {
        TrialReport {
            trial_id: self.id,
            protocol_version: crate::PROTOCOL_VERSION.to_string(),
            state: self.state,
            steps: self.steps,
            total_reward: self.total_reward,
            termination: self.termination,
            started_at: self.started_at,
            ended_at: self.ended_at,
        }
    }

    /// Mark the trial ended with no broadcast and surface the error.
    fn fail(&mut self, err: impl Into<TrialError>) -> TrialError {
        self.state = TrialState::Ended;
        self.ended_at = Some(Utc::now());
        let err = err.into();
        tracing::warn!(trial = %self.id, error = %err, "trial aborted");
        err
    }
}
