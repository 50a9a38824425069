mod config;
mod content_loader;
mod content_store;
mod error;
mod export;
mod front_matter;
mod hot_reload;
mod markdown;
mod models;
mod pages;
mod routes;
mod state;

use std::{net::SocketAddr, process::ExitCode, sync::Arc};

use tokio::{net::TcpListener, sync::broadcast};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;
use crate::content_loader::{install_content, load_content, load_layout};
use crate::export::export_site;
use crate::hot_reload::start_content_watcher;
use crate::routes::build_router;
use crate::state::{AppState, RouterState};

#[tokio::main]
async fn main() -> ExitCode {
    // logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    };
    info!("RUST_ENV is set to development: {}", config.is_development);

    let result = match config.export_dir.clone() {
        Some(out_dir) => export(&config, &out_dir).await,
        None => serve(config).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

async fn export(config: &Config, out_dir: &std::path::Path) -> Result<(), Box<dyn std::error::Error>> {
    let layout = load_layout(config).await?;
    let store = content_store::ContentStore::new(&config.posts_dir);
    export_site(&store, &layout, out_dir).await?;
    Ok(())
}

async fn serve(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    let port = config.port;
    let is_development = config.is_development;
    let state = Arc::new(AppState::new(config));

    // A broken post or duplicate slug fails startup.
    let content = load_content(&state.config, &state.store).await?;
    install_content(&state, content).await;

    let (tx, _rx) = broadcast::channel(1);
    if is_development {
        info!("Hot reload enabled. Check logs for file change events.");
        start_content_watcher(tx.clone(), state.clone());
    }

    let app = build_router(RouterState {
        app_state: state,
        broadcaster: tx,
    });

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!(%addr, "listening");
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
