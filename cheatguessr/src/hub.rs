// cheatguessr/src/hub.rs
use actix::{Actor, Addr, MailboxError};
use common::{Guess, HubConfig};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc::{self, error::TrySendError};

use crate::actors::registry_actor::{GetStatus, RegistryActor, RegistryCommand, RegistryStatus};

/// Key under which a session's outbound channel is registered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OutboundId(u64);

/// Non-owning producer end of a session's outbound channel
#[derive(Debug, Clone)]
pub struct Outbound {
    id: OutboundId,
    sender: mpsc::Sender<Guess>,
}

impl Outbound {
    pub fn id(&self) -> OutboundId {
        self.id
    }

    /// Enqueue without waiting; a full buffer hands the guess back
    pub(crate) fn try_deliver(&self, guess: Guess) -> Result<(), TrySendError<Guess>> {
        self.sender.try_send(guess)
    }
}

/// Handle to the registry actor, shared by every session and feed connector
#[derive(Clone)]
pub struct Hub {
    registry: Addr<RegistryActor>,
    next_id: Arc<AtomicU64>,
    outbound_capacity: usize,
}

impl Hub {
    /// Start the registry actor on the current actix system
    pub fn start(config: &HubConfig) -> Self {
        Self {
            registry: RegistryActor::new().start(),
            next_id: Arc::new(AtomicU64::new(0)),
            outbound_capacity: config.outbound_capacity.max(1),
        }
    }

    /// Create a bounded outbound channel for a new session
    pub fn outbound_channel(&self) -> (Outbound, mpsc::Receiver<Guess>) {
        let (sender, receiver) = mpsc::channel(self.outbound_capacity);
        let id = OutboundId(self.next_id.fetch_add(1, Ordering::Relaxed));
        (Outbound { id, sender }, receiver)
    }

    pub fn add(&self, outbound: Outbound, identity: String) {
        self.registry.do_send(RegistryCommand::Add { outbound, identity });
    }

    pub fn remove(&self, id: OutboundId) {
        self.registry.do_send(RegistryCommand::Remove { id });
    }

    pub fn broadcast(&self, guess: Guess) {
        self.registry.do_send(RegistryCommand::Broadcast(guess));
    }

    /// Resolves after every command submitted before it has been applied
    pub async fn status(&self) -> Result<RegistryStatus, MailboxError> {
        self.registry.send(GetStatus).await
    }
}
