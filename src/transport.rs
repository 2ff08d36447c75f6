//! Session transport contract and in-process channel transport
//!
//! The transport owns message encoding and actor connectivity; the engine
//! only sees classified metadata, an ordered inbound event channel, and the
//! outbound dispatch surface (`start`, `add_reward`, `produce_observations`,
//! `end`). Recipients are always an explicit set or "everyone" — there is no
//! wildcard string anywhere in the core.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::trial::error::TransportError;
use crate::trial::event::ActionEvent;
use crate::trial::observation::Observation;
use crate::trial::reward::RewardEvent;
use crate::trial::roles::ActorMetadata;

/// Addressees of an outbound message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Recipients {
    /// Every connected actor
    All,
    /// An explicit set of actor names
    Actors(BTreeSet<String>),
}

/// One outbound observation delivery
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Broadcast {
    /// Who receives this observation
    pub recipients: Recipients,
    /// The observation payload
    pub observation: Observation,
}

impl Broadcast {
    /// A broadcast addressed to every connected actor
    pub fn to_all(observation: Observation) -> Self {
        Self {
            recipients: Recipients::All,
            observation,
        }
    }
}

/// Session transport collaborator driven by the trial engine
///
/// Outbound calls run to completion without yielding; the inbound event
/// sequence is delivered separately as an ordered channel (see
/// [`ChannelTransport::channel`]).
pub trait SessionTransport: Send {
    /// Metadata for the connected actors, in stable connection order
    fn active_actors(&self) -> &[ActorMetadata];

    /// Deliver the initial (reset) broadcasts and open the trial
    fn start(&mut self, broadcasts: Vec<Broadcast>) -> Result<(), TransportError>;

    /// Dispatch a reward event
    fn add_reward(&mut self, reward: &RewardEvent) -> Result<(), TransportError>;

    /// Deliver continuation broadcasts; the trial keeps running
    fn produce_observations(&mut self, broadcasts: Vec<Broadcast>) -> Result<(), TransportError>;

    /// Deliver the final broadcasts and close the trial
    fn end(&mut self, broadcasts: Vec<Broadcast>) -> Result<(), TransportError>;
}

/// Everything a transport sends outward, in dispatch order
#[derive(Debug, Clone)]
pub enum OutboundMessage {
    /// Trial opened with the initial broadcasts
    Started(Vec<Broadcast>),
    /// A routed reward
    Reward(RewardEvent),
    /// Continuation broadcasts
    Observations(Vec<Broadcast>),
    /// Final broadcasts; the trial is over
    Ended(Vec<Broadcast>),
}

/// In-process transport over tokio channels.
///
/// Suitable for local trials and tests: inbound action events are fed
/// through an ordered mpsc channel and all outbound traffic is observable
/// as an ordered [`OutboundMessage`] stream.
pub struct ChannelTransport {
    actors: Vec<ActorMetadata>,
    outbound: mpsc::UnboundedSender<OutboundMessage>,
}

impl ChannelTransport {
    /// Build a transport for the given actors.
    ///
    /// Returns the transport, the sender half of the inbound event channel,
    /// and the receiver half of the outbound message stream.
    pub fn channel(
        actors: Vec<ActorMetadata>,
    ) -> (
        Self,
        mpsc::Sender<ActionEvent>,
        mpsc::Receiver<ActionEvent>,
        mpsc::UnboundedReceiver<OutboundMessage>,
    ) {
        let (event_tx, event_rx) = mpsc::channel(64);
        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();

        (
            Self {
                actors,
                outbound: outbound_tx,
            },
            event_tx,
            event_rx,
            outbound_rx,
        )
    }

    fn dispatch(&self, message: OutboundMessage) -> Result<(), TransportError> {
        self.outbound
            .send(message)
            .map_err(|_| TransportError::Closed)
    }
}

impl SessionTransport for ChannelTransport {
    fn active_actors(&self) -> &[ActorMetadata] {
        &self.actors
    }

    fn start(&mut self, broadcasts: Vec<Broadcast>) -> Result<(), TransportError> {
        self.dispatch(OutboundMessage::Started(broadcasts))
    }

    fn add_reward(&mut self, reward: &RewardEvent) -> Result<(), TransportError> {
        self.dispatch(OutboundMessage::Reward(reward.clone()))
    }

    fn produce_observations(&mut self, broadcasts: Vec<Broadcast>) -> Result<(), TransportError> {
        self.dispatch(OutboundMessage::Observations(broadcasts))
    }

    fn end(&mut self, broadcasts: Vec<Broadcast>) -> Result<(), TransportError> {
        self.dispatch(OutboundMessage::Ended(broadcasts))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::BTreeSet;

    fn observation() -> Observation {
        Observation {
            value: json!(1),
            rendered_frame: None,
            overridden_actors: BTreeSet::new(),
        }
    }

    #[test]
    fn test_outbound_ordering() {
        let (mut transport, _events, _rx, mut outbound) =
            ChannelTransport::channel(vec![ActorMetadata::new("alice", "primary")]);

        transport.start(vec![Broadcast::to_all(observation())]).unwrap();
        transport
            .add_reward(&RewardEvent {
                value: 1.0,
                confidence: 1.0,
                recipients: ["alice".to_string()].into_iter().collect(),
            })
            .unwrap();
        transport.end(vec![Broadcast::to_all(observation())]).unwrap();

        assert!(matches!(
            outbound.try_recv().unwrap(),
            OutboundMessage::Started(_)
        ));
        assert!(matches!(
            outbound.try_recv().unwrap(),
            OutboundMessage::Reward(_)
        ));
        assert!(matches!(
            outbound.try_recv().unwrap(),
            OutboundMessage::Ended(_)
        ));
        assert!(outbound.try_recv().is_err());
    }

    #[test]
    fn test_closed_outbound_reports_closed() {
        let (mut transport, _events, _rx, outbound) =
            ChannelTransport::channel(vec![ActorMetadata::new("alice", "primary")]);
        drop(outbound);

        let err = transport.start(vec![]).unwrap_err();
        assert!(matches!(err, TransportError::Closed));
    }
}
