// cheatguessr/src/dev_proxy.rs
use actix_web::http::StatusCode;
use actix_web::{web, HttpRequest, HttpResponse};
use thiserror::Error;
use url::Url;

use crate::routing::is_reserved_path;

// Headers that describe a single hop and must not be forwarded
const HOP_BY_HOP: &[&str] = &[
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
    "host",
];

#[derive(Debug, Error)]
pub enum ProxyError {
    #[error("invalid proxy target: {0}")]
    Target(#[from] url::ParseError),

    #[error("cannot build proxy client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Reverse proxy to a development server for the web client
#[derive(Clone)]
pub struct DevProxy {
    client: reqwest::Client,
    target: Url,
}

impl DevProxy {
    pub fn new(target: &str) -> Result<Self, ProxyError> {
        let target = Url::parse(target)?;
        // Redirects go back to the browser untouched
        let client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()?;
        Ok(Self { client, target })
    }

    /// Join the request path and query onto the target URL
    pub fn upstream_url(&self, path: &str, query: &str) -> Url {
        let mut url = self.target.clone();
        let base = url.path().trim_end_matches('/').to_string();
        url.set_path(&format!("{}{}", base, path));
        url.set_query(if query.is_empty() { None } else { Some(query) });
        url
    }
}

pub fn is_hop_by_hop(name: &str) -> bool {
    HOP_BY_HOP.iter().any(|hop| name.eq_ignore_ascii_case(hop))
}

/// Route every otherwise unmatched request through the proxy
pub fn configure(cfg: &mut web::ServiceConfig, proxy: DevProxy) {
    cfg.app_data(web::Data::new(proxy))
        .default_service(web::route().to(forward));
}

async fn forward(req: HttpRequest, body: web::Bytes, proxy: web::Data<DevProxy>) -> HttpResponse {
    // API and websocket paths are ours, not the web client's
    if is_reserved_path(req.path()) {
        return HttpResponse::NotFound().finish();
    }

    let url = proxy.upstream_url(req.path(), req.query_string());

    let method = match reqwest::Method::from_bytes(req.method().as_str().as_bytes()) {
        Ok(method) => method,
        Err(_) => return HttpResponse::MethodNotAllowed().finish(),
    };

    let mut upstream = proxy.client.request(method, url.clone());
    for (name, value) in req.headers() {
        if !is_hop_by_hop(name.as_str()) {
            upstream = upstream.header(name.as_str(), value.as_bytes());
        }
    }

    let response = match upstream.body(body).send().await {
        Ok(response) => response,
        Err(e) => {
            tracing::warn!("Dev proxy request to {} failed: {}", url, e);
            return HttpResponse::BadGateway().finish();
        }
    };

    let status = StatusCode::from_u16(response.status().as_u16()).unwrap_or(StatusCode::BAD_GATEWAY);
    let mut builder = HttpResponse::build(status);
    for (name, value) in response.headers() {
        if !is_hop_by_hop(name.as_str()) {
            builder.append_header((name.as_str(), value.as_bytes()));
        }
    }

    match response.bytes().await {
        Ok(bytes) => builder.body(bytes),
        Err(e) => {
            tracing::warn!("Dev proxy response from {} failed: {}", url, e);
            HttpResponse::BadGateway().finish()
        }
    }
}
