use std::sync::Arc;
use std::time::Duration;

use actix_cors::Cors;
use actix_web::{http::header, middleware::Logger, web, App, HttpServer};
use mongodb::Client;
use tracing_subscriber::EnvFilter;

mod balance;
mod codec;
mod config;
mod error;
mod exchange;
mod routes;
mod schemas;
mod share;
mod store;
mod trip;
mod validation;

use crate::config::Config;
use crate::routes::AppState;
use crate::share::{MemoryShareStore, MongoShareStore, ShareStore};
use crate::store::{MemoryTripStore, MongoTripStore};

async fn build_state(config: &Config) -> Result<AppState, mongodb::error::Error> {
    match &config.mongodb_uri {
        Some(uri) => {
            let client = Client::with_uri_str(uri).await?;
            let database = client.database(&config.database);
            tracing::info!(database = %config.database, "connected to MongoDB");
            Ok(AppState {
                trips: Arc::new(MongoTripStore::new(&database)),
                shares: Arc::new(MongoShareStore::new(&database)),
            })
        }
        None => {
            tracing::warn!("MONGODB_URI is not set, trips are kept in memory only");
            Ok(AppState {
                trips: Arc::new(MemoryTripStore::default()),
                shares: Arc::new(MemoryShareStore::default()),
            })
        }
    }
}

async fn cleanup_expired_shares(shares: Arc<dyn ShareStore>, every: Duration) {
    let mut interval = tokio::time::interval(every);
    loop {
        interval.tick().await;
        match shares.cleanup_expired().await {
            Ok(0) => {}
            Ok(cleaned) => tracing::info!("cleaned up {cleaned} expired shared trips"),
            Err(err) => tracing::error!("failed to clean up shared trips: {err}"),
        }
    }
}

#[actix_web::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::from_env()?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&config.log_filter))
        .init();

    let state = build_state(&config).await?;

    actix_web::rt::spawn(cleanup_expired_shares(
        state.shares.clone(),
        Duration::from_secs(config.cleanup_interval_secs.max(1)),
    ));

    tracing::info!("listening on {}:{}", config.bind, config.port);
    HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
            .allowed_header(header::CONTENT_TYPE);
        App::new()
            .wrap(cors)
            .wrap(Logger::default())
            .app_data(web::Data::new(state.clone()))
            .configure(routes::configure)
    })
    .bind((config.bind.as_str(), config.port))?
    .run()
    .await?;
    Ok(())
}
