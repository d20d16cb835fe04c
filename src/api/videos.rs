use actix_web::http::header::LOCATION;
use actix_web::http::StatusCode;
use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};

use super::session::AnonymousSession;
use super::shared::respond;
use crate::error::{AppError, Result};
use crate::services::admin_form::VideoForm;
use crate::store::VideoEntry;
use crate::AppState;

/// Where the admin listing lives; edit loads that cannot proceed land here.
pub const ADMIN_LIST_PATH: &str = "/admin";

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/videos")
            .route("", web::get().to(list_videos))
            .route("", web::post().to(create_video))
            .route("/{id}", web::get().to(get_video))
            .route("/{id}", web::put().to(update_video))
            .route("/{id}", web::delete().to(delete_video)),
    )
    .service(web::resource("/admin/edit").route(web::get().to(edit_video)));
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedVideo {
    pub video: VideoEntry,
    /// The form after a successful create: all fields cleared.
    pub form: VideoForm,
}

pub async fn list_videos(
    _session: AnonymousSession,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let videos = state.store.list().await?;
    Ok(respond(StatusCode::OK, videos))
}

pub async fn create_video(
    _session: AnonymousSession,
    state: web::Data<AppState>,
    form: web::Json<VideoForm>,
) -> Result<HttpResponse> {
    let entry = form.to_new_entry()?;

    let video = state
        .store
        .create(entry)
        .await
        .map_err(|e| AppError::write_failed("Failed to add video", e))?;

    log::info!("Video '{}' added as {}", video.title, video.id);
    Ok(respond(
        StatusCode::CREATED,
        CreatedVideo {
            video,
            form: VideoForm::cleared(),
        },
    ))
}

pub async fn get_video(
    _session: AnonymousSession,
    state: web::Data<AppState>,
    id: web::Path<String>,
) -> Result<HttpResponse> {
    let video = state
        .store
        .get(&id)
        .await?
        .ok_or_else(|| AppError::NotFound(id.into_inner()))?;
    Ok(respond(StatusCode::OK, video))
}

pub async fn update_video(
    _session: AnonymousSession,
    state: web::Data<AppState>,
    id: web::Path<String>,
    form: web::Json<VideoForm>,
) -> Result<HttpResponse> {
    let update = form.to_update()?;

    let video = state
        .store
        .update(&id, update)
        .await
        .map_err(|e| AppError::write_failed("Failed to update video.", e))?;

    log::info!("Video {} updated", video.id);
    Ok(respond(StatusCode::OK, video))
}

#[derive(Debug, Deserialize)]
pub struct DeleteParams {
    #[serde(default)]
    pub confirm: bool,
}

pub async fn delete_video(
    _session: AnonymousSession,
    state: web::Data<AppState>,
    id: web::Path<String>,
    params: web::Query<DeleteParams>,
) -> Result<HttpResponse> {
    if !params.confirm {
        return Err(AppError::ConfirmationRequired);
    }

    state
        .store
        .delete(&id)
        .await
        .map_err(|e| AppError::write_failed("Failed to delete video", e))?;

    // No undo: the id must be gone for good.
    if state.store.get(&id).await?.is_some() {
        return Err(AppError::Internal(format!(
            "video {} still present after delete",
            id
        )));
    }

    log::info!("Video {} deleted", id);
    Ok(HttpResponse::NoContent().finish())
}

#[derive(Debug, Deserialize)]
pub struct EditParams {
    pub id: Option<String>,
}

fn back_to_list(notice: Option<&str>) -> HttpResponse {
    let location = match notice {
        Some(notice) => format!("{}?notice={}", ADMIN_LIST_PATH, notice),
        None => ADMIN_LIST_PATH.to_string(),
    };
    HttpResponse::SeeOther()
        .insert_header((LOCATION, location))
        .finish()
}

/// Load the edit view. Without an id, or for a document that no longer
/// exists, send the admin back to the listing.
pub async fn edit_video(
    _session: AnonymousSession,
    state: web::Data<AppState>,
    params: web::Query<EditParams>,
) -> Result<HttpResponse> {
    let Some(id) = params.id.as_deref().map(str::trim).filter(|id| !id.is_empty()) else {
        return Ok(back_to_list(None));
    };

    match state.store.get(id).await? {
        Some(video) => Ok(respond(StatusCode::OK, VideoForm::from_entry(&video))),
        None => {
            log::warn!("Edit requested for missing video {}", id);
            Ok(back_to_list(Some("video-not-found")))
        }
    }
}
