use actix_web::http::StatusCode;
use actix_web::HttpResponse;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct APIError {
    pub cause: String,
    pub message: String,
}

/// Envelope for every JSON body: exactly one of `data` and `error` is set.
#[derive(Debug, Serialize)]
pub struct ResponseType<T = String> {
    pub data: Option<T>,
    pub error: Option<APIError>,
}

impl<T: Serialize> ResponseType<T> {
    pub fn ok(data: T) -> Self {
        Self {
            data: Some(data),
            error: None,
        }
    }
}

impl ResponseType<String> {
    pub fn failure(cause: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            data: None,
            error: Some(APIError {
                cause: cause.into(),
                message: message.into(),
            }),
        }
    }
}

pub fn respond<T: Serialize>(status: StatusCode, data: T) -> HttpResponse {
    HttpResponse::build(status).json(ResponseType::ok(data))
}
