// cheatguessr/src/actors/registry_actor.rs
use actix::{Actor, Context, Handler, Message, MessageResult};
use common::Guess;
use serde::Serialize;
use std::collections::HashMap;
use tokio::sync::mpsc::error::TrySendError;

use crate::hub::{Outbound, OutboundId};

/// Registry mutations and fan-out, applied one at a time in mailbox order
#[derive(Message)]
#[rtype(result = "()")]
pub enum RegistryCommand {
    Add { outbound: Outbound, identity: String },
    Remove { id: OutboundId },
    Broadcast(Guess),
}

/// Query for the current registry size and delivery counters
#[derive(Message)]
#[rtype(result = "RegistryStatus")]
pub struct GetStatus;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RegistryStatus {
    pub sessions: usize,
    pub delivered: u64,
    pub dropped: u64,
}

struct Registration {
    identity: String,
    outbound: Outbound,
}

/// Sole owner of the session registry
pub struct RegistryActor {
    sessions: HashMap<OutboundId, Registration>,
    delivered: u64,
    dropped: u64,
}

impl RegistryActor {
    pub fn new() -> Self {
        Self {
            sessions: HashMap::new(),
            delivered: 0,
            dropped: 0,
        }
    }

    fn add(&mut self, outbound: Outbound, identity: String) {
        tracing::debug!("Registering session {}", identity);
        self.sessions.insert(outbound.id(), Registration { identity, outbound });
    }

    fn remove(&mut self, id: OutboundId) {
        if let Some(registration) = self.sessions.remove(&id) {
            tracing::debug!("Unregistered session {}", registration.identity);
        }
    }

    // Never waits on a recipient: a full buffer drops the guess for that session only
    fn broadcast(&mut self, guess: Guess) {
        let mut dropped = 0u64;

        for registration in self.sessions.values() {
            if registration.identity == guess.identity {
                continue;
            }

            match registration.outbound.try_deliver(guess.clone()) {
                Ok(()) => self.delivered += 1,
                Err(TrySendError::Full(_)) => dropped += 1,
                // Writer already gone, the Remove is on its way
                Err(TrySendError::Closed(_)) => dropped += 1,
            }
        }

        if dropped > 0 {
            self.dropped += dropped;
            tracing::debug!(
                "Dropped {:?} guess from {} for {} slow session(s) ({} dropped in total)",
                guess.opcode,
                guess.identity,
                dropped,
                self.dropped
            );
        }
    }
}

impl Default for RegistryActor {
    fn default() -> Self {
        Self::new()
    }
}

impl Actor for RegistryActor {
    type Context = Context<Self>;

    fn started(&mut self, _ctx: &mut Self::Context) {
        tracing::info!("Registry actor started");
    }
}

impl Handler<RegistryCommand> for RegistryActor {
    type Result = ();

    fn handle(&mut self, msg: RegistryCommand, _ctx: &mut Self::Context) -> Self::Result {
        match msg {
            RegistryCommand::Add { outbound, identity } => self.add(outbound, identity),
            RegistryCommand::Remove { id } => self.remove(id),
            RegistryCommand::Broadcast(guess) => self.broadcast(guess),
        }
    }
}

impl Handler<GetStatus> for RegistryActor {
    type Result = MessageResult<GetStatus>;

    fn handle(&mut self, _msg: GetStatus, _ctx: &mut Self::Context) -> Self::Result {
        MessageResult(RegistryStatus {
            sessions: self.sessions.len(),
            delivered: self.delivered,
            dropped: self.dropped,
        })
    }
}
