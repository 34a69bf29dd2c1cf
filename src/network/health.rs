// src/network/health.rs
//! Liveness endpoint
//!
//! A single `GET /` answering with a fixed string, for hosting platforms
//! that probe a port to decide whether the process is alive. It doesn't
//! look at the publishing loop at all.

use crate::utils::error::BotError;
use axum::{Router, routing::get};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// Body returned by the liveness probe
pub const LIVENESS_BODY: &str = "Bot is running!";

async fn liveness() -> &'static str {
    LIVENESS_BODY
}

/// Router with the single liveness route
pub fn router() -> Router {
    Router::new().route("/", get(liveness))
}

/// Binds the liveness server on all interfaces
///
/// # Errors
/// Returns `BotError::Io` if the port can't be bound
pub async fn bind(port: u16) -> Result<TcpListener, BotError> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr).await?;
    log::info!("Health check listening on {}", listener.local_addr()?);
    Ok(listener)
}

/// Serves the liveness route on a background task
pub fn spawn(listener: TcpListener) -> JoinHandle<Result<(), BotError>> {
    tokio::spawn(async move {
        axum::serve(listener, router()).await?;
        Ok(())
    })
}

/// Waits for the server task to end
///
/// # Errors
/// The server's own I/O error, or `BotError::Task` if the task panicked
/// or was aborted
pub async fn join(server: &mut JoinHandle<Result<(), BotError>>) -> Result<(), BotError> {
    server.await?
}

/// Resolves once the server task has ended, after logging why
///
/// Never resolves when there is no server.
pub async fn supervise(server: Option<&mut JoinHandle<Result<(), BotError>>>) {
    let Some(server) = server else {
        return std::future::pending().await;
    };

    match join(server).await {
        Ok(()) => log::warn!("Health server stopped"),
        Err(e) => log::error!("Health server failed: {}", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpStream;

    async fn get(addr: SocketAddr, path: &str) -> String {
        let mut stream = TcpStream::connect(addr).await.unwrap();
        let request = format!(
            "GET {} HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n",
            path
        );
        stream.write_all(request.as_bytes()).await.unwrap();

        let mut response = String::new();
        stream.read_to_string(&mut response).await.unwrap();
        response
    }

    #[tokio::test]
    async fn root_answers_liveness_string() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = spawn(listener);

        let response = get(addr, "/").await;
        assert!(response.starts_with("HTTP/1.1 200"));
        assert!(response.contains("text/plain"));
        assert!(response.ends_with(LIVENESS_BODY));

        server.abort();
    }

    #[tokio::test]
    async fn other_paths_are_not_found() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = spawn(listener);

        let response = get(addr, "/metrics").await;
        assert!(response.starts_with("HTTP/1.1 404"));

        server.abort();
    }

    #[tokio::test]
    async fn aborted_server_is_reported_as_task_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let mut server = spawn(listener);
        server.abort();

        assert!(matches!(join(&mut server).await, Err(BotError::Task(_))));
    }

    #[tokio::test]
    async fn supervise_returns_when_server_ends() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let mut server = spawn(listener);
        server.abort();

        supervise(Some(&mut server)).await;
        assert!(server.is_finished());
    }

    #[tokio::test(start_paused = true)]
    async fn supervise_without_server_never_resolves() {
        let waited =
            tokio::time::timeout(std::time::Duration::from_secs(60), supervise(None)).await;
        assert!(waited.is_err());
    }
}
