//! Reward routing
//!
//! Rewards in this protocol are always attributed to the primary actor: its
//! policy is what is being trained or evaluated, and the supervisor never
//! receives reward, including on steps where its override was applied.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// A routed reward for one step
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RewardEvent {
    /// Scalar reward value
    pub value: f64,
    /// Confidence in the reward, in [0, 1]
    pub confidence: f32,
    /// Actor names receiving this reward
    pub recipients: BTreeSet<String>,
}

/// Routes raw per-step rewards to their recipients
#[derive(Debug, Clone)]
pub struct RewardRouter {
    primary_name: String,
}

impl RewardRouter {
    /// Create a router attributing rewards to the given primary actor
    pub fn new(primary_name: impl Into<String>) -> Self {
        Self {
            primary_name: primary_name.into(),
        }
    }

    /// Route a raw reward.
    ///
    /// An undefined reward is a normal outcome, not an error: no event is
    /// emitted. A defined reward yields one event with full confidence
    /// addressed to the primary actor only.
    pub fn route(&self, raw_reward: Option<f64>) -> Option<RewardEvent> {
        raw_reward.map(|value| RewardEvent {
            value,
            confidence: 1.0,
            recipients: [self.primary_name.clone()].into_iter().collect(),
        })
    }
}
