use utoipa::OpenApi;

use local_files_types::{ErrorResponse, SpotifyPathResponse, SpotifyStatus, TrackAddResponse};

use crate::api;

#[derive(OpenApi)]
#[openapi(
    paths(
        api::tracks::add_track,
        api::status::spotify_status,
        api::status::spotify_path,
        api::status::health,
    ),
    components(
        schemas(
            TrackAddResponse,
            ErrorResponse,
            SpotifyStatus,
            SpotifyPathResponse,
            api::TrackUploadForm,
            api::HealthResponse,
        )
    ),
    tags(
        (name = "local-files-server", description = "Spotify local files upload API")
    )
)]
pub struct ApiDoc;
