// cheatguessr/src/routing.rs
use actix_web::{error, web, Error, HttpRequest, HttpResponse};
use actix_web_actors::ws;
use common::{generate_identity, Config};

use crate::actors::guess_session::GuessSession;
use crate::hub::Hub;

/// Path of the guess websocket endpoint
pub const GUESS_WS_PATH: &str = "/chatguessr";

/// Configure the relay routes
pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource(GUESS_WS_PATH)
            .route(web::get().to(guess_ws_route))
    ).service(
        web::resource("/api/status")
            .route(web::get().to(status_route))
    );
}

/// Paths that must never fall through to the web client
pub fn is_reserved_path(path: &str) -> bool {
    path.starts_with("/api/") || path == GUESS_WS_PATH || path.starts_with("/chatguessr/")
}

/// WebSocket route for guess sessions
async fn guess_ws_route(
    req: HttpRequest,
    stream: web::Payload,
    hub: web::Data<Hub>,
    config: web::Data<Config>,
) -> Result<HttpResponse, Error> {
    // Refuse before any session state exists
    if let Err(e) = ws::handshake(&req) {
        tracing::warn!("Cannot upgrade connection: {}", e);
        return Err(e.into());
    }

    let identity = match generate_identity() {
        Ok(identity) => identity,
        Err(e) => {
            tracing::error!("Aborting connection: {}", e);
            return Ok(HttpResponse::InternalServerError().finish());
        },
    };

    let session = GuessSession::new(identity, hub.get_ref().clone(), &config.hub);
    ws::start(session, &req, stream)
}

/// Registry size and delivery counters
async fn status_route(hub: web::Data<Hub>) -> Result<HttpResponse, Error> {
    let status = hub.status().await.map_err(error::ErrorInternalServerError)?;
    Ok(HttpResponse::Ok().json(status))
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{http::StatusCode, test as actix_test, App};
    use serde_json::Value;

    #[test]
    fn reserved_paths() {
        assert!(is_reserved_path("/chatguessr"));
        assert!(is_reserved_path("/api/status"));
        assert!(!is_reserved_path("/"));
        assert!(!is_reserved_path("/chatguessr-map"));
        assert!(!is_reserved_path("/static/js/main.js"));
    }

    #[actix_web::test]
    async fn plain_request_is_refused_without_registering() {
        let config = Config::default();
        let hub = Hub::start(&config.hub);
        let app = actix_test::init_service(
            App::new()
                .app_data(web::Data::new(hub.clone()))
                .app_data(web::Data::new(config))
                .configure(routes),
        )
        .await;

        let req = actix_test::TestRequest::get().uri(GUESS_WS_PATH).to_request();
        let resp = actix_test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(hub.status().await.unwrap().sessions, 0);
    }

    #[actix_web::test]
    async fn status_reports_registry_counters() {
        let config = Config::default();
        let hub = Hub::start(&config.hub);
        let (outbound, _inbox) = hub.outbound_channel();
        hub.add(outbound, "a".into());

        let app = actix_test::init_service(
            App::new()
                .app_data(web::Data::new(hub))
                .app_data(web::Data::new(config))
                .configure(routes),
        )
        .await;

        let req = actix_test::TestRequest::get().uri("/api/status").to_request();
        let body: Value = actix_test::call_and_read_body_json(&app, req).await;

        assert_eq!(body["sessions"], 1);
        assert_eq!(body["dropped"], 0);
    }
}
