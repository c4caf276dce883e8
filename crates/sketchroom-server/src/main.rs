use sketchroom_server::{app, config::ConfigError, state::spawn_sweeper, AppState, Config};
use std::process::ExitCode;
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info};

#[derive(Debug, Error)]
enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("server I/O: {0}")]
    Io(#[from] std::io::Error),
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sketchroom_server=info,tower_http=info".into()),
        )
        .init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), StartupError> {
    let config = Config::load()?;
    let addr = config.server_address()?;
    let cors = config.cors_layer()?;
    let state = Arc::new(AppState::new(&config));

    if !config.room_idle_ttl().is_zero() {
        spawn_sweeper(state.clone(), config.sweep_interval());
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("SketchRoom relay server listening on {}", listener.local_addr()?);
    info!("WebSocket endpoint: ws://{}/ws?room=<id>", listener.local_addr()?);

    axum::serve(listener, app(state, cors)).await?;
    Ok(())
}
