#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Actix-Web API server for the glamping map.
//!
//! Serves the property listing used by the map, property detail with
//! nearby properties, the glossary, and the sitemap. Property listings
//! are cached in memory until explicitly revalidated.

pub mod cache;
pub mod config;
mod handlers;
pub mod interactive;

use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{App, HttpServer, middleware, web};
use glamping_map_content::ContentError;
use glamping_map_content::glossary::Glossary;
use glamping_map_database::retry::RetryPolicy;
use glamping_map_database::{PropertyStore, StoreError, db};

use crate::cache::{MemoryResponseCache, ResponseCache};
use crate::config::{AppConfig, ConfigError};

/// Shared application state.
pub struct AppState {
    /// Property storage.
    pub store: Arc<dyn PropertyStore>,
    /// Rendered-response cache.
    pub cache: Arc<dyn ResponseCache>,
    /// Glossary content, loaded once at startup.
    pub glossary: Arc<Glossary>,
    /// Server settings.
    pub config: AppConfig,
    /// Retry policy for the nearby-properties lookup.
    pub retry: RetryPolicy,
}

/// Errors that stop the server from starting.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Invalid server settings.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// Storage could not be set up.
    #[error(transparent)]
    Store(#[from] StoreError),
    /// Embedded content failed to load.
    #[error(transparent)]
    Content(#[from] ContentError),
    /// Binding or running the HTTP server failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Registers every route.
pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .route("/health", web::get().to(handlers::health))
            .route("/properties", web::get().to(handlers::properties))
            .route("/properties/{slug}", web::get().to(handlers::property_detail))
            .route("/glossary", web::get().to(handlers::glossary))
            .route("/glossary/{slug}", web::get().to(handlers::glossary_term))
            .route("/revalidate", web::post().to(handlers::revalidate)),
    )
    .route("/sitemap.xml", web::get().to(handlers::sitemap));
}

/// Starts the glamping map API server.
///
/// Reads settings from the environment, connects the property store,
/// loads the glossary, and runs the Actix-Web HTTP server. The caller
/// provides the async runtime (e.g. via `#[actix_web::main]`) and
/// initializes logging.
///
/// # Errors
///
/// Returns [`ServerError`] if the settings are invalid, the store cannot
/// be created, the glossary fails to load, or the server fails to bind.
#[allow(clippy::future_not_send)]
pub async fn run_server() -> Result<(), ServerError> {
    let config = AppConfig::from_env()?;

    log::info!("Connecting to property store...");
    let store = db::connect_from_env()?;

    let glossary = Glossary::embedded()?;
    log::info!("Loaded {} glossary terms", glossary.terms().len());

    if config.revalidate_token.is_none() {
        log::warn!("REVALIDATE_TOKEN is not set; cached listings can only be cleared by a restart");
    }

    let bind_addr = config.bind_addr.clone();
    let port = config.port;

    let cache = Arc::new(MemoryResponseCache::with_capacity(config.cache_capacity));

    let state = web::Data::new(AppState {
        store,
        cache,
        glossary: Arc::new(glossary),
        config,
        retry: RetryPolicy::default(),
    });

    log::info!("Starting server on {bind_addr}:{port}");

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .configure(routes)
    })
    .bind((bind_addr, port))?
    .run()
    .await?;

    Ok(())
}
