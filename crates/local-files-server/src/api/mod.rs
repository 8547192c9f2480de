//! HTTP API handlers.
//!
//! Defines the Actix routes for track uploads and local files setup status.

pub mod status;
pub mod tracks;

pub use status::{HealthResponse, health, spotify_path, spotify_status};
pub use tracks::{TrackUploadForm, add_track};

#[cfg(test)]
mod tests {
    use actix_web::http::{StatusCode, header};
    use actix_web::{App, test, web};
    use id3::{Tag, TagLike};
    use local_files_types::{ErrorResponse, SpotifyPathResponse, SpotifyStatus, TrackAddResponse};

    use crate::api;
    use crate::ingest::TrackIngest;
    use crate::state::AppState;

    const BOUNDARY: &str = "------------------------local-files-test";

    struct Part<'a> {
        name: &'a str,
        file_name: Option<&'a str>,
        content_type: Option<&'a str>,
        data: &'a [u8],
    }

    impl<'a> Part<'a> {
        fn text(name: &'a str, value: &'a str) -> Self {
            Self {
                name,
                file_name: None,
                content_type: None,
                data: value.as_bytes(),
            }
        }

        fn file(name: &'a str, file_name: &'a str, content_type: &'a str, data: &'a [u8]) -> Self {
            Self {
                name,
                file_name: Some(file_name),
                content_type: Some(content_type),
                data,
            }
        }
    }

    fn multipart_body(parts: &[Part<'_>]) -> Vec<u8> {
        let mut body = Vec::new();
        for part in parts {
            body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
            let mut disposition = format!("Content-Disposition: form-data; name=\"{}\"", part.name);
            if let Some(file_name) = part.file_name {
                disposition.push_str(&format!("; filename=\"{file_name}\""));
            }
            body.extend_from_slice(disposition.as_bytes());
            body.extend_from_slice(b"\r\n");
            if let Some(content_type) = part.content_type {
                body.extend_from_slice(format!("Content-Type: {content_type}\r\n").as_bytes());
            }
            body.extend_from_slice(b"\r\n");
            body.extend_from_slice(part.data);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        body
    }

    fn upload_request(parts: &[Part<'_>]) -> test::TestRequest {
        test::TestRequest::post()
            .uri("/api/tracks")
            .insert_header((
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            ))
            .set_payload(multipart_body(parts))
    }

    fn make_state(max_upload_bytes: usize) -> (tempfile::TempDir, web::Data<AppState>) {
        let tmp = tempfile::tempdir().expect("create temp dir");
        let ingest = TrackIngest::new(tmp.path().join("Local Files"));
        (tmp, web::Data::new(AppState::new(ingest, max_upload_bytes)))
    }

    const MP3: &[u8] = &[0xFF, 0xFB, 0x90, 0x64, 0, 0, 0, 0, 0, 0, 0, 0];
    const SONG_META: &str = r#"{"title":"Song","artist":"Artist","album":"Album"}"#;

    #[actix_web::test]
    async fn add_track_writes_tagged_file() {
        let (_tmp, state) = make_state(1024 * 1024);
        let app = test::init_service(App::new().app_data(state.clone()).service(api::add_track)).await;

        let req = upload_request(&[
            Part::file("file", "song.mp3", "audio/mpeg", MP3),
            Part::text("metadata", SONG_META),
        ])
        .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: TrackAddResponse = test::read_body_json(resp).await;

        assert_eq!(body.status, "success");
        assert!(body.path.ends_with("Artist - Song.mp3"));
        let tag = Tag::read_from_path(&body.path).expect("tag written");
        assert_eq!(tag.title(), Some("Song"));
        assert_eq!(tag.artist(), Some("Artist"));
        assert_eq!(tag.album(), Some("Album"));
        assert_eq!(tag.album_artist(), Some("Artist"));
        assert_eq!(tag.pictures().count(), 0);
    }

    #[actix_web::test]
    async fn add_track_rejects_malformed_metadata_json() {
        let (tmp, state) = make_state(1024 * 1024);
        let app = test::init_service(App::new().app_data(state.clone()).service(api::add_track)).await;

        let req = upload_request(&[
            Part::file("file", "song.mp3", "audio/mpeg", MP3),
            Part::text("metadata", "{not valid json"),
        ])
        .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: ErrorResponse = test::read_body_json(resp).await;

        assert_eq!(body.detail, "Invalid JSON format in metadata.");
        assert!(!tmp.path().join("Local Files").exists());
    }

    #[actix_web::test]
    async fn add_track_rejects_missing_required_field() {
        let (_tmp, state) = make_state(1024 * 1024);
        let app = test::init_service(App::new().app_data(state.clone()).service(api::add_track)).await;

        let req = upload_request(&[
            Part::file("file", "song.mp3", "audio/mpeg", MP3),
            Part::text("metadata", r#"{"title":"Song","artist":"Artist"}"#),
        ])
        .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: ErrorResponse = test::read_body_json(resp).await;
        assert!(body.detail.contains("album"));
    }

    #[actix_web::test]
    async fn add_track_rejects_unwritable_custom_path() {
        let (tmp, state) = make_state(1024 * 1024);
        let blocker = tmp.path().join("read-only");
        std::fs::write(&blocker, b"not a directory").unwrap();
        let custom = blocker.join("Local Files").to_string_lossy().to_string();
        let app = test::init_service(App::new().app_data(state.clone()).service(api::add_track)).await;

        let req = upload_request(&[
            Part::file("file", "song.mp3", "audio/mpeg", MP3),
            Part::text("metadata", SONG_META),
            Part::text("custom_path", &custom),
        ])
        .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: ErrorResponse = test::read_body_json(resp).await;
        assert!(body.detail.starts_with("Invalid or inaccessible save path:"));
    }

    #[actix_web::test]
    async fn add_track_embeds_cover_with_declared_mime() {
        let (_tmp, state) = make_state(1024 * 1024);
        let app = test::init_service(App::new().app_data(state.clone()).service(api::add_track)).await;

        let req = upload_request(&[
            Part::file("file", "song.mp3", "audio/mpeg", MP3),
            Part::text("metadata", SONG_META),
            Part::file("cover", "cover.bin", "image/png", b"\x89PNG fake"),
        ])
        .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: TrackAddResponse = test::read_body_json(resp).await;

        let tag = Tag::read_from_path(&body.path).unwrap();
        let pictures: Vec<_> = tag.pictures().collect();
        assert_eq!(pictures.len(), 1);
        assert_eq!(pictures[0].mime_type, "image/png");
        assert_eq!(pictures[0].data, b"\x89PNG fake".to_vec());
    }

    #[actix_web::test]
    async fn add_track_reports_tagging_failure_as_server_error() {
        let (tmp, state) = make_state(1024 * 1024);
        let app = test::init_service(App::new().app_data(state.clone()).service(api::add_track)).await;

        let req = upload_request(&[
            Part::file("file", "song.mp3", "audio/mpeg", b"ID3\x09\x00\x00\x00\x00\x00\x00audio"),
            Part::text("metadata", SONG_META),
        ])
        .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body: ErrorResponse = test::read_body_json(resp).await;

        assert!(body.detail.starts_with("read tags: "), "{}", body.detail);
        assert!(tmp.path().join("Local Files").join("Artist - Song.mp3").exists());
    }

    #[actix_web::test]
    async fn add_track_requires_audio_part() {
        let (_tmp, state) = make_state(1024 * 1024);
        let app = test::init_service(App::new().app_data(state.clone()).service(api::add_track)).await;

        let resp = test::call_service(&app, upload_request(&[Part::text("metadata", SONG_META)]).to_request()).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: ErrorResponse = test::read_body_json(resp).await;
        assert_eq!(body.detail, "Missing `file` upload.");
    }

    #[actix_web::test]
    async fn add_track_enforces_upload_limit() {
        let (tmp, state) = make_state(4);
        let app = test::init_service(App::new().app_data(state.clone()).service(api::add_track)).await;

        let req = upload_request(&[
            Part::file("file", "song.mp3", "audio/mpeg", MP3),
            Part::text("metadata", "{}"),
        ])
        .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert!(!tmp.path().join("Local Files").exists());
    }

    #[actix_web::test]
    async fn spotify_status_reflects_default_directory() {
        let (tmp, state) = make_state(1024);
        let app = test::init_service(
            App::new()
                .app_data(state.clone())
                .service(api::spotify_status)
                .service(api::spotify_path),
        )
        .await;

        let req = test::TestRequest::get().uri("/api/spotify-status").to_request();
        let status: SpotifyStatus = test::call_and_read_body_json(&app, req).await;
        assert!(!status.local_files_enabled);
        assert!(!status.path_writable);
        assert_eq!(status.tips.len(), 4);

        std::fs::create_dir_all(tmp.path().join("Local Files")).unwrap();
        let req = test::TestRequest::get().uri("/api/spotify-status").to_request();
        let status: SpotifyStatus = test::call_and_read_body_json(&app, req).await;
        assert!(status.local_files_enabled);
        assert!(status.path_writable);

        let req = test::TestRequest::get().uri("/api/spotify-path").to_request();
        let path: SpotifyPathResponse = test::call_and_read_body_json(&app, req).await;
        assert_eq!(path.path, status.path);
    }

    #[actix_web::test]
    async fn health_ok() {
        let app = test::init_service(App::new().service(api::health)).await;
        let req = test::TestRequest::get().uri("/health").to_request();
        let resp = test::call_service(&app, req).await;
        assert!(resp.status().is_success());
    }
}
