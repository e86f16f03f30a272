// cheatguessr/src/main.rs

use actix_web::{web, App, HttpServer};
use cheatguessr::cli::Args;
use cheatguessr::dev_proxy::{self, DevProxy};
use cheatguessr::feed::FeedConnector;
use cheatguessr::hub::Hub;
use cheatguessr::{routing, static_files};
use clap::Parser;
use common::{setup_tracing, Config};
use tokio_util::sync::CancellationToken;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Setup tracing
    setup_tracing();

    // Files and environment first, flags on top
    let args = Args::parse();
    let mut config = Config::from_env();
    args.apply(&mut config);

    let bind_addr = config.bind_addr();

    let web_proxy = if config.dev {
        let proxy = DevProxy::new(&config.proxy_url)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;
        tracing::info!("Development mode, proxying web client to {}", config.proxy_url);
        Some(proxy)
    } else {
        None
    };

    // One hub for the whole process
    let hub = Hub::start(&config.hub);

    let shutdown = CancellationToken::new();
    let feeds: Vec<_> = config
        .feeds
        .iter()
        .cloned()
        .map(|feed| {
            let connector = FeedConnector::new(feed, hub.clone());
            tracing::info!("Injecting feed {}", connector.name());
            connector.spawn(shutdown.clone())
        })
        .collect();

    tracing::info!("Starting cheatguessr on {}", bind_addr);

    let request_timeout = config.request_timeout();
    let static_config = config.static_files.clone();
    let config_data = web::Data::new(config);
    let hub_data = web::Data::new(hub);

    let result = HttpServer::new(move || {
        App::new()
            .app_data(hub_data.clone())
            .app_data(config_data.clone())
            .configure(routing::routes)
            .configure(|cfg| match &web_proxy {
                Some(proxy) => dev_proxy::configure(cfg, proxy.clone()),
                None => static_files::configure(cfg, &static_config),
            })
    })
    .client_request_timeout(request_timeout)
    .bind(&bind_addr)?
    .run()
    .await;

    // Server stopped, wind the feeds down
    shutdown.cancel();
    for feed in feeds {
        let _ = feed.await;
    }

    result
}
