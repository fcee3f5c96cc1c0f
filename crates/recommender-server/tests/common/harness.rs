//! Test server harness.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use recommender::catalog::{Catalog, CatalogRow};
use recommender::embedding::MockEmbedder;
use recommender::engine::RetrievalEngine;
use recommender::storage::EmbeddingStore;
use recommender_server::gateway::{HandlerState, create_router_with_state};
use tempfile::TempDir;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

const STARTUP_WAIT_TIMEOUT_SECS: u64 = 5;
const STARTUP_POLL_INTERVAL_MS: u64 = 50;

pub const VOCABULARY: [&str; 6] = ["java", "python", "sql", "leadership", "teamwork", "sales"];

pub const TEST_ORIGIN: &str = "http://localhost:3000";

/// Six-row catalog: four technical tests, two behavioral inventories.
pub fn sample_catalog() -> Catalog {
    Catalog::new(vec![
        CatalogRow::new(
            "Java 8",
            "https://example.com/java",
            "java programming",
            "Knowledge & Skills",
        ),
        CatalogRow::new(
            "Python",
            "https://example.com/python",
            "python programming",
            "Knowledge & Skills",
        ),
        CatalogRow::new(
            "SQL Server",
            "https://example.com/sql",
            "sql queries",
            "Knowledge & Skills",
        ),
        CatalogRow::new(
            "Java Frameworks",
            "https://example.com/java-frameworks",
            "java java frameworks",
            "Knowledge & Skills",
        ),
        CatalogRow::new(
            "OPQ Leadership",
            "https://example.com/leadership",
            "leadership teamwork",
            "Personality & Behavior",
        ),
        CatalogRow::new(
            "Sales Profile",
            "https://example.com/sales",
            "sales teamwork",
            "Personality & Behavior",
        ),
    ])
}

#[derive(Debug, Clone)]
pub struct TestServerConfig {
    pub port: u16,
    pub top_k: usize,
    pub cors_origins: Vec<String>,
    pub embeddings_path: Option<PathBuf>,
    /// Leave the readiness slot empty instead of publishing an engine.
    pub skip_engine: bool,
    pub embedder: MockEmbedder,
}

impl Default for TestServerConfig {
    fn default() -> Self {
        Self {
            port: 0,
            top_k: 10,
            cors_origins: vec![TEST_ORIGIN.to_string()],
            embeddings_path: None,
            skip_engine: false,
            embedder: MockEmbedder::with_vocabulary(&VOCABULARY),
        }
    }
}

pub struct TestServer {
    pub addr: SocketAddr,
    pub state: HandlerState<MockEmbedder>,
    _server_handle: JoinHandle<()>,
    shutdown_tx: Option<oneshot::Sender<()>>,
    _temp_dir: TempDir,
}

impl TestServer {
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

pub async fn wait_for_server_ready(
    addr: SocketAddr,
    timeout: Duration,
    interval: Duration,
) -> Result<(), ServerStartupError> {
    let start = std::time::Instant::now();

    loop {
        if start.elapsed() > timeout {
            return Err(ServerStartupError::Timeout);
        }

        match tokio::net::TcpStream::connect(addr).await {
            Ok(_) => return Ok(()),
            Err(_) => tokio::time::sleep(interval).await,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ServerStartupError {
    #[error("Server failed to start within timeout")]
    Timeout,
    #[error("Failed to bind to address: {0}")]
    BindError(#[from] std::io::Error),
    #[error("Server startup failed: {0}")]
    StartupFailed(String),
}

/// Spawns the router on a loopback port with a [`MockEmbedder`]-backed engine.
///
/// The embedding cache lives in a temp dir owned by the returned server unless
/// `embeddings_path` points elsewhere.
pub async fn spawn_test_server(config: TestServerConfig) -> Result<TestServer, ServerStartupError> {
    let addr = SocketAddr::from(([127, 0, 0, 1], config.port));
    let listener = TcpListener::bind(addr).await?;
    let local_addr = listener.local_addr()?;

    let temp_dir = TempDir::new()?;
    let embeddings_path = config
        .embeddings_path
        .unwrap_or_else(|| temp_dir.path().join("embeddings.bin"));

    let state = HandlerState::new(config.top_k, config.cors_origins);
    if !config.skip_engine {
        let engine = RetrievalEngine::build(
            sample_catalog(),
            config.embedder,
            &EmbeddingStore::new(embeddings_path),
        )
        .map_err(|e| ServerStartupError::StartupFailed(e.to_string()))?;
        state.publish(engine);
    }

    let app = create_router_with_state(state.clone());
    let (shutdown_tx, shutdown_rx) = oneshot::channel();

    let server_handle = tokio::spawn(async move {
        let _ = axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
            })
            .await;
    });

    wait_for_server_ready(
        local_addr,
        Duration::from_secs(STARTUP_WAIT_TIMEOUT_SECS),
        Duration::from_millis(STARTUP_POLL_INTERVAL_MS),
    )
    .await?;

    Ok(TestServer {
        addr: local_addr,
        state,
        _server_handle: server_handle,
        shutdown_tx: Some(shutdown_tx),
        _temp_dir: temp_dir,
    })
}
