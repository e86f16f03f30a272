// cheatguessr/src/actors/guess_session.rs
use actix::{Actor, ActorContext, AsyncContext, StreamHandler};
use actix_web_actors::ws;
use common::{Guess, HubConfig, InboundGuess};
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

use crate::hub::{Hub, Outbound, OutboundId};

/// Actor driving one participant's websocket session.
///
/// The websocket stream is the read loop and the outbound channel stream is the
/// write loop; whichever ends first stops the actor, and `stopped` tears down.
pub struct GuessSession {
    identity: String,
    hub: Hub,
    outbound_id: OutboundId,
    // Both handed over in `started`
    outbound: Option<Outbound>,
    inbox: Option<mpsc::Receiver<Guess>>,
    heartbeat_interval: Duration,
    client_timeout: Duration,
    last_heartbeat: Instant,
}

impl GuessSession {
    pub fn new(identity: String, hub: Hub, config: &HubConfig) -> Self {
        let (outbound, inbox) = hub.outbound_channel();
        Self {
            identity,
            hub,
            outbound_id: outbound.id(),
            outbound: Some(outbound),
            inbox: Some(inbox),
            heartbeat_interval: config.heartbeat_interval(),
            client_timeout: config.client_timeout(),
            last_heartbeat: Instant::now(),
        }
    }

    // Silent clients count as a transport failure
    fn heartbeat(&self, ctx: &mut ws::WebsocketContext<Self>) {
        ctx.run_interval(self.heartbeat_interval, |act, ctx| {
            if Instant::now().duration_since(act.last_heartbeat) > act.client_timeout {
                tracing::warn!("Client heartbeat timeout: {}", act.identity);
                ctx.stop();
                return;
            }

            ctx.ping(b"");
        });
    }

    fn relay(&mut self, payload: &[u8], ctx: &mut ws::WebsocketContext<Self>) {
        match InboundGuess::parse(payload) {
            Ok(inbound) => {
                let guess = inbound.into_message(&self.identity);
                tracing::debug!(
                    "Guess from {}: ({}, {})",
                    self.identity,
                    guess.location.lat,
                    guess.location.lng
                );
                self.hub.broadcast(guess);
            },
            Err(e) => {
                tracing::debug!("Ending session {} on unreadable message: {}", self.identity, e);
                ctx.stop();
            }
        }
    }
}

impl Actor for GuessSession {
    type Context = ws::WebsocketContext<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        tracing::info!("Client connected: {}", self.identity);

        self.hub.broadcast(Guess::connect(self.identity.clone()));

        if let Some(inbox) = self.inbox.take() {
            ctx.add_stream(ReceiverStream::new(inbox));
        }
        if let Some(outbound) = self.outbound.take() {
            self.hub.add(outbound, self.identity.clone());
        }

        self.heartbeat(ctx);
    }

    fn stopped(&mut self, _ctx: &mut Self::Context) {
        tracing::info!("Client disconnected: {}", self.identity);

        self.hub.remove(self.outbound_id);
        self.hub.broadcast(Guess::disconnect(self.identity.clone()));
    }
}

// Read loop
impl StreamHandler<Result<ws::Message, ws::ProtocolError>> for GuessSession {
    fn handle(&mut self, msg: Result<ws::Message, ws::ProtocolError>, ctx: &mut Self::Context) {
        self.last_heartbeat = Instant::now();

        match msg {
            Ok(ws::Message::Text(text)) => self.relay(text.as_bytes(), ctx),
            Ok(ws::Message::Binary(bin)) => self.relay(&bin, ctx),
            Ok(ws::Message::Ping(msg)) => ctx.pong(&msg),
            Ok(ws::Message::Pong(_)) => (),
            Ok(ws::Message::Close(reason)) => {
                tracing::debug!("Client {} closing connection: {:?}", self.identity, reason);
                ctx.close(reason);
                ctx.stop();
            },
            // Fragmented guesses are not part of the protocol
            Ok(ws::Message::Continuation(_)) => ctx.stop(),
            Ok(ws::Message::Nop) => (),
            Err(e) => {
                tracing::debug!("WebSocket protocol error for {}: {}", self.identity, e);
                ctx.stop();
            }
        }
    }
}

// Write loop
impl StreamHandler<Guess> for GuessSession {
    fn handle(&mut self, guess: Guess, ctx: &mut Self::Context) {
        match serde_json::to_string(&guess) {
            Ok(json) => ctx.text(json),
            Err(e) => {
                tracing::error!("Failed to serialize guess for {}: {}", self.identity, e);
                ctx.stop();
            }
        }
    }
}
