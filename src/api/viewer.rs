use actix_web::http::header::{CACHE_CONTROL, CONTENT_TYPE};
use actix_web::http::StatusCode;
use actix_web::web::Bytes;
use actix_web::{web, HttpResponse};
use futures::StreamExt;
use serde::Deserialize;

use super::session::{SilentSession, SESSION_HEADER};
use super::shared::ResponseType;
use crate::services::viewer::{activate, ViewerView};
use crate::AppState;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/viewer")
            .route("", web::get().to(viewer_snapshot))
            .route("/live", web::get().to(viewer_live)),
    );
}

#[derive(Debug, Deserialize)]
pub struct ViewerParams {
    pub select: Option<String>,
}

/// One page activation rendered once.
pub async fn viewer_snapshot(
    session: SilentSession,
    state: web::Data<AppState>,
    params: web::Query<ViewerParams>,
) -> HttpResponse {
    let mut activation = activate(state.store.as_ref(), state.mode_source.as_ref(), true).await;
    if let Some(id) = params.select.as_deref() {
        activation = activation.select(id);
    }
    let view = ViewerView::render(activation.into_state(), state.default_provider);

    let mut response = HttpResponse::build(StatusCode::OK);
    if session.minted {
        response.insert_header((SESSION_HEADER, session.token));
    }
    response.json(ResponseType::ok(view))
}

/// A mounted viewer. Each store change becomes one `viewer` event; the store
/// subscription lives exactly as long as this connection.
pub async fn viewer_live(session: SilentSession, state: web::Data<AppState>) -> HttpResponse {
    let activation = activate(state.store.as_ref(), state.mode_source.as_ref(), true).await;
    let provider = state.default_provider;

    let events = activation.into_stream().map(move |viewer_state| {
        let view = ViewerView::render(viewer_state, provider);
        let payload = serde_json::to_string(&view).map_err(actix_web::error::ErrorInternalServerError)?;
        Ok::<_, actix_web::Error>(Bytes::from(format!("event: viewer\ndata: {}\n\n", payload)))
    });

    let mut response = HttpResponse::build(StatusCode::OK);
    response
        .insert_header((CONTENT_TYPE, "text/event-stream"))
        .insert_header((CACHE_CONTROL, "no-cache"));
    if session.minted {
        response.insert_header((SESSION_HEADER, session.token));
    }
    response.streaming(events)
}
