use std::future::{ready, Ready};

use actix_web::dev::Payload;
use actix_web::http::StatusCode;
use actix_web::{web, FromRequest, HttpRequest, HttpResponse};
use serde::Serialize;

use super::shared::ResponseType;
use crate::error::AppError;
use crate::AppState;

pub const SESSION_HEADER: &str = "x-session-id";

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/session").route(web::post().to(establish)));
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SessionResponse {
    session_id: String,
}

async fn establish(state: web::Data<AppState>) -> HttpResponse {
    let session_id = state.sessions.establish();
    HttpResponse::build(StatusCode::CREATED)
        .insert_header((SESSION_HEADER, session_id.clone()))
        .json(ResponseType::ok(SessionResponse { session_id }))
}

fn header_token(req: &HttpRequest) -> Option<String> {
    req.headers()
        .get(SESSION_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Gate for store-touching handlers: the request must carry a session
/// previously handed out by this server.
#[derive(Debug, Clone)]
pub struct AnonymousSession(pub String);

impl FromRequest for AnonymousSession {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let Some(state) = req.app_data::<web::Data<AppState>>() else {
            return ready(Err(AppError::Internal("application state missing".into())));
        };
        ready(match header_token(req) {
            Some(token) if state.sessions.is_valid(&token) => Ok(AnonymousSession(token)),
            _ => Err(AppError::Unauthorized),
        })
    }
}

/// The viewer's silent handshake: reuse a valid session or mint one.
#[derive(Debug, Clone)]
pub struct SilentSession {
    pub token: String,
    pub minted: bool,
}

impl FromRequest for SilentSession {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let Some(state) = req.app_data::<web::Data<AppState>>() else {
            return ready(Err(AppError::Internal("application state missing".into())));
        };
        let session = match header_token(req) {
            Some(token) if state.sessions.is_valid(&token) => SilentSession {
                token,
                minted: false,
            },
            _ => SilentSession {
                token: state.sessions.establish(),
                minted: true,
            },
        };
        ready(Ok(session))
    }
}
