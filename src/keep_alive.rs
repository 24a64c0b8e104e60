//! Minimal HTTP responder so hosting platforms see the process as alive.

use axum::{Router, routing::get};
use tokio::net::TcpListener;

use crate::error::Result;

pub const ALIVE_MESSAGE: &str = "Bot is running!";

async fn alive() -> &'static str {
    ALIVE_MESSAGE
}

pub fn router() -> Router {
    Router::new().route("/", get(alive))
}

/// Bind `addr` and serve until the process exits.
pub async fn serve(addr: &str) -> Result<()> {
    let listener = TcpListener::bind(addr).await?;
    log::info!("Keep-alive listening on http://{}", listener.local_addr()?);
    serve_on(listener).await
}

pub async fn serve_on(listener: TcpListener) -> Result<()> {
    axum::serve(listener, router()).await?;
    Ok(())
}
