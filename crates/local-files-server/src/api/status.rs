//! Setup status and health handlers.

use std::path::Path;

use actix_web::{HttpResponse, Responder, get, web};
use local_files_types::{SpotifyPathResponse, SpotifyStatus};
use serde::Serialize;
use utoipa::ToSchema;

use crate::save_path::probe_writable;
use crate::state::AppState;

const SETUP_TIPS: [&str; 4] = [
    "Enable 'Show Local Files' in Spotify Settings",
    "Add your local files folder in Spotify Settings",
    "Make sure files are in MP3, M4P, M4A, or WAV format",
    "Ensure Spotify has permission to access local files",
];

#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: &'static str,
}

#[utoipa::path(
    get,
    path = "/api/spotify-status",
    responses(
        (status = 200, description = "Default save directory status", body = SpotifyStatus)
    )
)]
#[get("/api/spotify-status")]
/// Report whether the default local files directory exists and is writable.
pub async fn spotify_status(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(status_for(state.default_save_dir()))
}

#[utoipa::path(
    get,
    path = "/api/spotify-path",
    responses(
        (status = 200, description = "Default save directory", body = SpotifyPathResponse)
    )
)]
#[get("/api/spotify-path")]
/// Return the default local files directory.
pub async fn spotify_path(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(SpotifyPathResponse {
        path: state.default_save_dir().to_string_lossy().to_string(),
    })
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Server is up", body = HealthResponse)
    )
)]
#[get("/health")]
pub async fn health() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse { status: "ok" })
}

fn status_for(dir: &Path) -> SpotifyStatus {
    let local_files_enabled = dir.exists();
    let path_writable = local_files_enabled && probe_writable(dir).is_ok();
    SpotifyStatus {
        local_files_enabled,
        path_writable,
        path: dir.to_string_lossy().to_string(),
        tips: SETUP_TIPS.iter().map(|tip| tip.to_string()).collect(),
    }
}
