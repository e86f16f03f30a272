// cheatguessr/tests/support/mod.rs
#![allow(dead_code)]

use actix_web::{web, App, HttpServer};
use cheatguessr::hub::Hub;
use cheatguessr::routing;
use common::{Config, HubConfig};
use futures::StreamExt;
use serde_json::Value;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio_tungstenite::{connect_async, tungstenite::protocol::Message, MaybeTlsStream, WebSocketStream};

pub type Client = WebSocketStream<MaybeTlsStream<TcpStream>>;

pub const WAIT: Duration = Duration::from_secs(5);

pub fn test_config() -> Config {
    Config {
        hub: HubConfig {
            outbound_capacity: 16,
            heartbeat_interval_secs: 60,
            client_timeout_secs: 120,
        },
        ..Config::default()
    }
}

/// Boot the relay routes on an ephemeral port
pub async fn start_relay(config: Config) -> (SocketAddr, Hub) {
    let hub = Hub::start(&config.hub);
    let hub_data = web::Data::new(hub.clone());
    let config_data = web::Data::new(config);

    let server = HttpServer::new(move || {
        App::new()
            .app_data(hub_data.clone())
            .app_data(config_data.clone())
            .configure(routing::routes)
    })
    .workers(1)
    .bind(("127.0.0.1", 0))
    .expect("bind relay");

    let addr = server.addrs()[0];
    actix::spawn(async move {
        let _ = server.run().await;
    });

    (addr, hub)
}

pub async fn connect(addr: SocketAddr) -> Client {
    let (client, _) = connect_async(format!("ws://{}{}", addr, routing::GUESS_WS_PATH))
        .await
        .expect("websocket connect");
    client
}

/// Next guess delivered to the client, skipping control frames
pub async fn next_guess(client: &mut Client) -> Value {
    tokio::time::timeout(WAIT, async {
        loop {
            match client.next().await {
                Some(Ok(Message::Text(text))) => return serde_json::from_str(&text).expect("guess json"),
                Some(Ok(_)) => continue,
                other => panic!("session ended while waiting for a guess: {:?}", other),
            }
        }
    })
    .await
    .expect("timed out waiting for a guess")
}

/// True once the server has closed the session
pub async fn wait_closed(client: &mut Client) -> bool {
    tokio::time::timeout(WAIT, async {
        loop {
            match client.next().await {
                Some(Ok(Message::Close(_))) | None | Some(Err(_)) => return true,
                Some(Ok(_)) => continue,
            }
        }
    })
    .await
    .unwrap_or(false)
}

/// Wait until the registry holds `sessions` entries
pub async fn settle(hub: &Hub, sessions: usize) {
    tokio::time::timeout(WAIT, async {
        while hub.status().await.expect("registry alive").sessions != sessions {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("registry did not settle");
}
