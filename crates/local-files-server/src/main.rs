//! `local-files-server` — drop tracks into Spotify's local files folder.
//!
//! Accepts an MP3 upload with JSON metadata (and an optional cover), saves it
//! as `"{artist} - {title}.mp3"` and writes ID3v2.4 tags Spotify understands.

mod api;
mod config;
mod cover_art;
mod ingest;
mod metadata;
mod openapi;
mod save_path;
mod startup;
mod state;
mod tag_writer;

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

const VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("GIT_SHA"),
    ", ",
    env!("BUILD_DATE"),
    ")"
);

#[derive(Parser, Debug)]
#[command(name = "local-files-server", version = VERSION)]
pub(crate) struct Args {
    /// HTTP bind address, e.g. 127.0.0.1:8080
    #[arg(long)]
    bind: Option<std::net::SocketAddr>,

    /// Default directory tracks are saved to (defaults to Spotify's local files folder)
    #[arg(long)]
    save_dir: Option<PathBuf>,

    /// Optional server config file (TOML)
    #[arg(long)]
    config: Option<PathBuf>,
}

#[actix_web::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new("info,actix_web=info,local_files_server=info")
        }))
        .init();

    startup::run(args).await
}
