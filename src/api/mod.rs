// src/api/mod.rs
pub mod embed;
pub mod health;
pub mod session;
pub mod shared;
pub mod videos;
pub mod viewer;

use actix_web::web;

use crate::error::AppError;

/// Malformed bodies get the same envelope as every other failure.
fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .error_handler(|err, _req| AppError::BadRequest(err.to_string()).into())
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .app_data(json_config())
            .configure(session::configure)
            .configure(videos::configure)
            .configure(viewer::configure)
            .configure(embed::configure)
            .configure(health::configure),
    );
}
