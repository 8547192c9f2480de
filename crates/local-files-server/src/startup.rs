//! Actix server startup + app wiring.
//!
//! Resolves config, builds the shared state, routes, middleware, and OpenAPI endpoints.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::task::{Context, Poll};

use actix_cors::Cors;
use actix_files::{Files, NamedFile};
use actix_web::dev::{Service, ServiceRequest, ServiceResponse};
use actix_web::{App, Error, HttpServer, web};
use anyhow::Result;
use futures_util::future::{LocalBoxFuture, Ready, ok};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api;
use crate::config;
use crate::ingest::TrackIngest;
use crate::openapi;
use crate::save_path::resolve_save_path;
use crate::state::AppState;

/// Build server state and start the Actix HTTP server.
pub(crate) async fn run(args: crate::Args) -> Result<()> {
    let cfg = load_config(args.config.as_ref())?;
    let bind = resolve_bind(args.bind, &cfg)?;
    let save_dir = resolve_save_dir(args.save_dir, &cfg)?;
    let max_upload_bytes = config::max_upload_bytes_from_config(&cfg);
    let cors_origins = config::cors_origins_from_config(&cfg);
    let web_ui_dist = locate_web_ui_dist();
    tracing::info!(
        bind = %bind,
        save_dir = %save_dir.display(),
        max_upload_bytes,
        "starting local-files-server"
    );
    if let Some(dist) = web_ui_dist.as_ref() {
        tracing::info!(path = %dist.display(), "web ui static assets enabled");
    } else {
        tracing::info!("web ui static assets disabled (web-ui/dist not found)");
    }

    match resolve_save_path(None, &save_dir) {
        Ok(dir) => tracing::info!(path = %dir.display(), "default save directory ready"),
        Err(err) => tracing::warn!(
            path = %err.path().display(),
            error = %err,
            "default save directory unavailable; uploads need custom_path until fixed"
        ),
    }

    let state = web::Data::new(AppState::new(TrackIngest::new(save_dir), max_upload_bytes));

    HttpServer::new(move || {
        let cors = cors_origins
            .iter()
            .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
            .allowed_methods(vec!["GET", "POST"])
            .allowed_headers(vec![actix_web::http::header::CONTENT_TYPE])
            .max_age(3600);

        let mut app = App::new()
            .app_data(state.clone())
            .wrap(cors)
            .wrap(FilteredLogger)
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-doc/openapi.json", openapi::ApiDoc::openapi()),
            )
            .service(api::add_track)
            .service(api::spotify_status)
            .service(api::spotify_path)
            .service(api::health);

        if let Some(dist) = web_ui_dist.clone() {
            let assets_dir = dist.join("assets");
            if assets_dir.exists() {
                app = app.service(Files::new("/assets", assets_dir));
            }

            let index_path = dist.join("index.html");
            if index_path.exists() {
                let index_root = index_path.clone();
                app = app
                    .service(
                        web::resource("/")
                            .route(web::get().to(move || serve_index(index_root.clone()))),
                    )
                    .service(
                        web::resource("/index.html")
                            .route(web::get().to(move || serve_index(index_path.clone()))),
                    );
            }
        }

        app
    })
    .bind(bind)?
    .run()
    .await?;

    Ok(())
}

/// Return true when the request path should be logged.
fn should_log_path(path: &str) -> bool {
    !(path == "/health" || path.starts_with("/assets/") || path.starts_with("/swagger-ui/"))
}

/// Actix middleware that filters noisy paths from logging.
struct FilteredLogger;

impl<S, B> actix_web::dev::Transform<S, ServiceRequest> for FilteredLogger
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = FilteredLoggerMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ok(FilteredLoggerMiddleware { service })
    }
}

/// Service wrapper that applies the logging filter.
struct FilteredLoggerMiddleware<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for FilteredLoggerMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, ctx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let path = req.path().to_string();
        let should_log = should_log_path(&path);
        let method = req.method().clone();
        let peer = req
            .connection_info()
            .realip_remote_addr()
            .unwrap_or("-")
            .to_string();
        let ua = req
            .headers()
            .get("User-Agent")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("-")
            .to_string();
        let start = std::time::Instant::now();
        let fut = self.service.call(req);
        Box::pin(async move {
            let res = fut.await?;
            if should_log {
                tracing::info!(
                    method = %method,
                    path = %path,
                    status = %res.status().as_u16(),
                    user_agent = %ua,
                    peer = %peer,
                    elapsed_ms = %start.elapsed().as_millis(),
                    "http request"
                );
            }
            Ok(res)
        })
    }
}

/// Load server config from `--config`, a `config.toml` next to the binary, or defaults.
fn load_config(path: Option<&PathBuf>) -> Result<config::ServerConfig> {
    if let Some(path) = path {
        return config::ServerConfig::load(path);
    }
    let auto_path = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join("config.toml")))
        .filter(|path| path.exists());
    match auto_path {
        Some(path) => {
            tracing::info!(path = %path.display(), "using config next to executable");
            config::ServerConfig::load(&path)
        }
        None => Ok(config::ServerConfig::default()),
    }
}

/// Resolve the final bind address from args + config.
fn resolve_bind(bind: Option<SocketAddr>, cfg: &config::ServerConfig) -> Result<SocketAddr> {
    match bind {
        Some(addr) => Ok(addr),
        None => config::bind_from_config(cfg),
    }
}

/// Resolve the default save directory from args + config.
fn resolve_save_dir(dir: Option<PathBuf>, cfg: &config::ServerConfig) -> Result<PathBuf> {
    match dir {
        Some(dir) => Ok(dir),
        None => config::save_dir_from_config(cfg),
    }
}

/// Optional prebuilt web client; none ships with the server.
fn locate_web_ui_dist() -> Option<PathBuf> {
    let mut bases = Vec::new();
    if let Ok(dir) = std::env::current_dir() {
        bases.push(dir);
    }
    if let Some(parent) = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(PathBuf::from))
    {
        bases.push(parent);
    }
    find_web_ui_dist(bases)
}

fn find_web_ui_dist(bases: impl IntoIterator<Item = PathBuf>) -> Option<PathBuf> {
    bases
        .into_iter()
        .map(|base| base.join("web-ui").join("dist"))
        .find(|path| path.is_dir())
}

async fn serve_index(index_path: PathBuf) -> actix_web::Result<NamedFile> {
    Ok(NamedFile::open(index_path)?)
}
