//! Test server harness.
//!
//! Spawns the full gateway on an ephemeral port with **all external
//! dependencies mocked**: in-memory vector index, deterministic embedder,
//! fixed-output extractor, and no LLM re-ranker unless requested.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use pricematch::embedding::{MockEmbedder, TextEmbedder};
use pricematch::extraction::{ExtractedProduct, MockExtractor};
use pricematch::pipeline::{CatalogPipeline, PipelineConfig};
use pricematch::query;
use pricematch::reranker::MockReranker;
use pricematch::vectordb::{
    CatalogIndex, MockCatalogIndex, ProductPayload, ProductVectorRecord,
};
use pricematch_server::gateway::{HandlerState, create_router_with_state};

pub const TEST_COLLECTION_NAME: &str = "pricematch_test_catalog";
pub const TEST_EMBEDDING_DIM: usize = 8;

const STARTUP_WAIT_TIMEOUT_SECS: u64 = 5;
const STARTUP_POLL_INTERVAL_MS: u64 = 50;

pub struct TestServer {
    pub addr: SocketAddr,
    _server_handle: JoinHandle<()>,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl TestServer {
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ServerStartupError {
    #[error("Server failed to start within timeout")]
    Timeout,
    #[error("Failed to bind to address: {0}")]
    BindError(#[from] std::io::Error),
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
            Err(_) => {
                tokio::time::sleep(interval).await;
            }
        }
    }
}

/// Seeds the mock index so each given product retrieves its own catalog
/// point at cosine 1.0 under the filters the pipeline will build for it.
pub async fn seed_products(index: &MockCatalogIndex, products: &[(u64, &ExtractedProduct)]) {
    let embedder = MockEmbedder::new(TEST_EMBEDDING_DIM);
    for (id, product) in products {
        let vector = embedder
            .embed(&query::build_query_text(product))
            .await
            .unwrap();
        let payload = ProductPayload {
            codigo: Some(*id as i64),
            marca: product.brand.as_ref().map(|b| b.to_uppercase()),
            peso: Some(pricematch::units::normalize(&product.unit_of_measure)),
            precio: Some(899.0),
            ..Default::default()
        };
        index
            .upsert(
                TEST_COLLECTION_NAME,
                vec![ProductVectorRecord::new(*id, vector, payload)],
            )
            .await
            .unwrap();
    }
}

/// Spawns a fully-mocked test server; `extracted` is what the mock
/// extractor returns for every uploaded image.
pub async fn spawn_test_server(
    extracted: Vec<ExtractedProduct>,
    seeded: &[(u64, &ExtractedProduct)],
) -> Result<TestServer, ServerStartupError> {
    let index = MockCatalogIndex::new();
    index
        .ensure_collection(TEST_COLLECTION_NAME, TEST_EMBEDDING_DIM as u64)
        .await
        .unwrap();
    seed_products(&index, seeded).await;

    let config = PipelineConfig::new()
        .with_collection_name(TEST_COLLECTION_NAME)
        .with_embedding_dim(TEST_EMBEDDING_DIM);

    let pipeline = CatalogPipeline::new(
        MockExtractor::with_products(extracted),
        MockEmbedder::new(TEST_EMBEDDING_DIM),
        index,
        None::<MockReranker>,
        config,
    )
    .unwrap();

    let app = create_router_with_state(HandlerState::new(Arc::new(pipeline)));

    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;

    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
    let server_handle = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
            })
            .await
            .expect("test server failed");
    });

    wait_for_server_ready(
        addr,
        Duration::from_secs(STARTUP_WAIT_TIMEOUT_SECS),
        Duration::from_millis(STARTUP_POLL_INTERVAL_MS),
    )
    .await?;

    Ok(TestServer {
        addr,
        _server_handle: server_handle,
        shutdown_tx: Some(shutdown_tx),
    })
}
