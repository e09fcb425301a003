//! HTTP surface of the analyzer. Requests are translated into calls to [crate::analysis] and the
//! results are serialized into JSON right before being returned.

pub mod pages;
pub mod response;
pub mod routes;
pub mod shutdown;

use std::{convert::Infallible, net::SocketAddr, path::PathBuf, sync::Arc};

use anyhow::Result;
use hyper::{
    service::{make_service_fn, service_fn},
    Server,
};
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::storage::presence_source::{CachedPresenceSource, CsvPresenceSource, PresenceSource};

#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// CSV file with `user_id,date,start,end` rows.
    pub data_csv: PathBuf,
    /// Directory with HTML pages served under `/<name>`.
    pub pages_dir: PathBuf,
    pub bind: SocketAddr,
    /// Keep parsed data between requests until the file changes.
    pub cache: bool,
}

/// Shared by every request.
pub struct AppState {
    pub source: Box<dyn PresenceSource>,
    pub pages_dir: PathBuf,
}

impl AppState {
    pub fn new(config: &ServerConfig) -> Self {
        let source: Box<dyn PresenceSource> = if config.cache {
            Box::new(CachedPresenceSource::new(config.data_csv.clone()))
        } else {
            Box::new(CsvPresenceSource::new(config.data_csv.clone()))
        };
        Self {
            source,
            pages_dir: config.pages_dir.clone(),
        }
    }
}

/// Serves requests until `shutdown_token` is cancelled.
pub async fn start_server(config: ServerConfig, shutdown_token: CancellationToken) -> Result<()> {
    run_server(config, shutdown_token, None).await
}

/// Same as [start_server], additionally sends the bound address into `bound` once listening.
/// Useful when binding port 0.
pub async fn run_server(
    config: ServerConfig,
    shutdown_token: CancellationToken,
    bound: Option<oneshot::Sender<SocketAddr>>,
) -> Result<()> {
    let state = Arc::new(AppState::new(&config));

    let make_svc = make_service_fn(move |_conn| {
        let state = state.clone();
        async move {
            Ok::<_, Infallible>(service_fn(move |req| {
                let state = state.clone();
                async move { Ok::<_, Infallible>(routes::handle_request(req, &state).await) }
            }))
        }
    });

    let server = Server::try_bind(&config.bind)?.serve(make_svc);

    let local_addr = server.local_addr();
    info!("Presence analyzer listening on http://{local_addr}");
    if let Some(bound) = bound {
        // Receiver going away only means nobody is interested in the address
        let _ = bound.send(local_addr);
    }
    info!("Reading presence data from {:?}", config.data_csv);

    server
        .with_graceful_shutdown(async move { shutdown_token.cancelled().await })
        .await?;

    info!("Server stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use anyhow::Result;
    use tokio::{
        io::{AsyncReadExt, AsyncWriteExt},
        net::TcpStream,
        sync::oneshot,
    };
    use tokio_util::sync::CancellationToken;

    use crate::storage::presence_source::TEST_DATA_CSV;

    use super::{run_server, ServerConfig};

    /// Smoke test through a real socket on a port picked by the OS.
    #[tokio::test]
    async fn smoke_test_server() -> Result<()> {
        let config = ServerConfig {
            data_csv: TEST_DATA_CSV.into(),
            pages_dir: concat!(env!("CARGO_MANIFEST_DIR"), "/templates").into(),
            bind: "127.0.0.1:0".parse()?,
            cache: true,
        };
        let shutdown_token = CancellationToken::new();
        let (sender, receiver) = oneshot::channel();
        let server = tokio::spawn(run_server(config, shutdown_token.clone(), Some(sender)));

        let addr = receiver.await?;
        assert_ne!(addr.port(), 0);

        let mut stream = TcpStream::connect(addr).await?;
        stream
            .write_all(b"GET /api/v1/users HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n")
            .await?;
        let mut response = String::new();
        stream.read_to_string(&mut response).await?;

        assert!(response.starts_with("HTTP/1.1 200 OK"));
        assert!(response.ends_with(r#"[{"user_id":10,"name":"User 10"},{"user_id":11,"name":"User 11"}]"#));

        shutdown_token.cancel();
        server.await??;
        Ok(())
    }
}
