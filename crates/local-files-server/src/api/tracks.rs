//! Track upload handler.

use actix_multipart::{Field, Multipart, MultipartError};
use actix_web::{HttpResponse, Responder, post, web};
use futures_util::TryStreamExt;
use local_files_types::{ErrorResponse, TrackAddResponse};
use utoipa::ToSchema;

use crate::cover_art::CoverImage;
use crate::ingest::{IngestError, TrackUpload};
use crate::state::AppState;

/// Multipart form accepted by `POST /api/tracks`.
#[derive(ToSchema)]
#[allow(dead_code)]
pub struct TrackUploadForm {
    /// Audio file, stored verbatim.
    #[schema(value_type = String, format = Binary)]
    pub file: Vec<u8>,
    /// JSON object: `title`, `artist`, `album`, optional `year` and `track_number`.
    pub metadata: String,
    /// Optional cover image; its content type becomes the picture MIME type.
    #[schema(value_type = Option<String>, format = Binary)]
    pub cover: Option<Vec<u8>>,
    /// Optional directory overriding the default save location.
    pub custom_path: Option<String>,
}

#[utoipa::path(
    post,
    path = "/api/tracks",
    request_body(content = TrackUploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Track saved and tagged", body = TrackAddResponse),
        (status = 400, description = "Invalid metadata or save path", body = ErrorResponse),
        (status = 413, description = "Upload too large", body = ErrorResponse),
        (status = 500, description = "Write or tagging failed", body = ErrorResponse)
    )
)]
#[post("/api/tracks")]
/// Save an uploaded track into the local files folder and tag it for Spotify.
pub async fn add_track(state: web::Data<AppState>, payload: Multipart) -> impl Responder {
    let upload = match read_upload(payload, state.max_upload_bytes).await {
        Ok(upload) => upload,
        Err(err) => {
            tracing::warn!(error = %err, "track upload rejected");
            return err.into_response();
        }
    };

    let ingest = state.ingest.clone();
    let result = tokio::task::spawn_blocking(move || ingest.add_track(upload))
        .await
        .unwrap_or_else(|err| Err(IngestError::Internal(format!("ingest task failed: {err}"))));

    match result {
        Ok(outcome) => {
            tracing::info!(
                path = %outcome.path.display(),
                cover = outcome.cover_written,
                "track added"
            );
            HttpResponse::Ok().json(TrackAddResponse::success(outcome.path.to_string_lossy()))
        }
        Err(err) => {
            if err.status().is_server_error() {
                tracing::error!(error = %err, "track ingest failed");
            } else {
                tracing::warn!(error = %err, "track ingest rejected");
            }
            err.into_response()
        }
    }
}

/// Buffer the known form fields; unknown fields are drained and ignored.
async fn read_upload(mut payload: Multipart, limit: usize) -> Result<TrackUpload, IngestError> {
    let mut audio = None;
    let mut metadata = None;
    let mut cover = None;
    let mut custom_path = None;

    while let Some(mut field) = payload.try_next().await.map_err(form_error)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => audio = Some(read_field(&mut field, limit).await?),
            "metadata" => metadata = Some(read_field(&mut field, limit).await?),
            "cover" => {
                let declared_mime = field.content_type().map(|mime| mime.to_string());
                let file_name = field
                    .content_disposition()
                    .and_then(|cd| cd.get_filename())
                    .map(str::to_string);
                let data = read_field(&mut field, limit).await?;
                // browsers send an empty part when no file was picked
                if !data.is_empty() {
                    cover = Some(CoverImage {
                        data,
                        declared_mime,
                        file_name,
                    });
                }
            }
            "custom_path" => {
                let raw = read_field(&mut field, limit).await?;
                let value = String::from_utf8(raw).map_err(|_| {
                    IngestError::Validation("custom_path must be valid UTF-8.".to_string())
                })?;
                custom_path = Some(value);
            }
            other => {
                tracing::debug!(field = other, "ignoring unknown form field");
                read_field(&mut field, limit).await?;
            }
        }
    }

    let audio =
        audio.ok_or_else(|| IngestError::Validation("Missing `file` upload.".to_string()))?;
    let metadata = metadata
        .ok_or_else(|| IngestError::Validation("Missing `metadata` field.".to_string()))?;

    Ok(TrackUpload {
        audio,
        metadata,
        cover,
        custom_path,
    })
}

async fn read_field(field: &mut Field, limit: usize) -> Result<Vec<u8>, IngestError> {
    let mut buf = Vec::new();
    while let Some(chunk) = field.try_next().await.map_err(form_error)? {
        if buf.len() + chunk.len() > limit {
            return Err(IngestError::PayloadTooLarge { limit });
        }
        buf.extend_from_slice(&chunk);
    }
    Ok(buf)
}

fn form_error(err: MultipartError) -> IngestError {
    IngestError::Validation(format!("Malformed multipart body: {err}"))
}
