use actix_web::http::StatusCode;
use actix_web::{web, HttpResponse};
use serde::Deserialize;

use super::shared::respond;
use crate::error::{AppError, Result};
use crate::services::embed::{self, Provider};
use crate::AppState;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/embed").route(web::get().to(describe_embed)));
}

#[derive(Debug, Deserialize)]
pub struct EmbedParams {
    pub source: String,
    pub provider: Option<Provider>,
    #[serde(default)]
    pub autoplay: bool,
    pub title: Option<String>,
}

/// Player descriptor for a bare id, a page URL, or a pasted embed snippet.
pub async fn describe_embed(
    state: web::Data<AppState>,
    params: web::Query<EmbedParams>,
) -> Result<HttpResponse> {
    let provider = params.provider.unwrap_or(state.default_provider);
    let descriptor = embed::describe(
        provider,
        &params.source,
        params.title.as_deref().unwrap_or("Video Player"),
        params.autoplay,
    );
    if descriptor.video_id.is_empty() {
        return Err(AppError::BadRequest(format!(
            "no {} video id in source",
            provider.as_str()
        )));
    }
    Ok(respond(StatusCode::OK, descriptor))
}
