use std::net::SocketAddr;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::info;

use crate::api::{create_router, AppState};
use crate::config::ServerConfig;
use crate::error::{LblError, Result};
use crate::services::LeagueService;

/// Start the API server and serve until `shutdown` turns true
pub async fn start_api_server(
    league: LeagueService,
    server: &ServerConfig,
    mut shutdown: watch::Receiver<bool>,
) -> Result<()> {
    let app = create_router(AppState::new(league));

    let addr: SocketAddr = format!("{}:{}", server.host, server.port)
        .parse()
        .map_err(|e| LblError::Internal(format!("invalid listen address: {}", e)))?;
    let listener = TcpListener::bind(addr).await?;
    info!("API server listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            while !*shutdown.borrow() {
                if shutdown.changed().await.is_err() {
                    break;
                }
            }
            info!("API server shutting down");
        })
        .await?;

    Ok(())
}
