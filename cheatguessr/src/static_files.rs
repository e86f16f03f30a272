// cheatguessr/src/static_files.rs
use actix_files::{Files, NamedFile};
use actix_web::dev::{fn_service, ServiceRequest, ServiceResponse};
use actix_web::{web, HttpResponse};
use common::StaticFilesConfig;
use std::path::PathBuf;

use crate::routing::is_reserved_path;

/// Serve the built web client with SPA fallback.
/// Unknown paths get the index document so client-side routing keeps working.
pub fn configure(cfg: &mut web::ServiceConfig, config: &StaticFilesConfig) {
    let root_path = PathBuf::from(&config.path);
    let index_path = root_path.join(&config.index);

    cfg.service(
        Files::new("/", &root_path)
            .index_file(config.index.clone())
            .prefer_utf8(true)
            .use_etag(true)
            .use_last_modified(true)
            .default_handler(fn_service(move |req: ServiceRequest| {
                let index_path = index_path.clone();
                async move {
                    let (req, _) = req.into_parts();

                    // Don't serve index.html for API or WebSocket routes
                    if is_reserved_path(req.path()) {
                        return Ok::<_, actix_web::Error>(ServiceResponse::new(
                            req,
                            HttpResponse::NotFound().finish(),
                        ));
                    }

                    let file = NamedFile::open_async(&index_path).await?;
                    let res = file.into_response(&req);
                    Ok(ServiceResponse::new(req, res))
                }
            })),
    );
}
