//! Entry point for the comic shelf.
//!
//! Responsibilities here are intentionally minimal:
//! - Parse command-line arguments.
//! - Load user configuration from `conf/config.toml`.
//! - Connect the catalog backend and bring up the shelf.

mod app;
mod backend;
mod comic;
mod config;
mod progress;
mod strip;

use crate::app::{App, settle};
use crate::backend::HttpBackend;
use crate::config::load_config;
use anyhow::{Context, Result, anyhow};
use std::env;
use std::path::Path;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*, reload};

type ReloadHandle = reload::Handle<EnvFilter, tracing_subscriber::Registry>;

fn main() {
    let reload_handle = init_tracing();
    if let Err(err) = run(&reload_handle) {
        error!("{err:?}");
        std::process::exit(1);
    }
}

fn run(reload_handle: &ReloadHandle) -> Result<()> {
    let mut config = load_config(Path::new("conf/config.toml"));
    if let Some(url) = parse_args()? {
        config.backend_url = url;
    }
    set_log_level(reload_handle, config.log_level.as_filter_str());
    info!(
        backend = %config.backend_url,
        level = %config.log_level,
        "Starting comic shelf"
    );

    let backend = HttpBackend::new(&config.backend_url)
        .context("Failed to construct the backend client")?;

    let (mut app, effects) = App::bootstrap(config);
    settle(&mut app, &backend, effects);

    if let Some(error) = app.shelf().error() {
        return Err(anyhow!("Could not load the shelf: {error}"));
    }
    info!(
        loaded = app.shelf().comics().len(),
        total = app.shelf().total_comics(),
        has_more = app.shelf().has_more(),
        "Shelf ready"
    );
    for comic in app.shelf().comics() {
        info!(
            title = %comic.shelf_name(),
            favorite = comic.is_favorite,
            page = comic.current_page,
            pages = comic.total_pages,
            "Shelved comic"
        );
    }
    Ok(())
}

fn parse_args() -> Result<Option<String>> {
    let mut args = env::args().skip(1);
    match args.next() {
        None => Ok(None),
        Some(url) if url.starts_with("http://") || url.starts_with("https://") => Ok(Some(url)),
        Some(_) => Err(anyhow!("Usage: comic-shelf [backend-url]")),
    }
}

fn init_tracing() -> ReloadHandle {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));
    let (filter_layer, handle) = reload::Layer::new(env_filter);
    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .with_filter(filter_layer),
        )
        .init();
    warn!("Logging initialized; override level with config.log_level or RUST_LOG");
    handle
}

fn set_log_level(handle: &ReloadHandle, level: &str) {
    let parsed = EnvFilter::builder()
        .parse(level)
        .unwrap_or_else(|_| EnvFilter::new("debug"));
    if let Err(err) = handle.modify(|filter| *filter = parsed.clone()) {
        warn!(%level, "Failed to update log level from config: {err}");
    } else {
        info!(%level, "Applied log level from config");
    }
}
