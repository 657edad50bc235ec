//! Pricematch HTTP server entrypoint.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use mimalloc::MiMalloc;
use tokio::net::TcpListener;
use tokio::signal;

use pricematch::config::Config;
use pricematch::embedding::GeminiEmbedder;
use pricematch::extraction::GeminiVisionExtractor;
use pricematch::pipeline::{CatalogPipeline, PipelineConfig};
use pricematch::reranker::LlmReranker;
use pricematch::vectordb::QdrantCatalogIndex;
use pricematch_server::gateway::{HandlerState, create_router_with_state};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    println!(
        r#"
██████╗ ██████╗ ██╗ ██████╗███████╗███╗   ███╗ █████╗ ████████╗ ██████╗██╗  ██╗
██╔══██╗██╔══██╗██║██╔════╝██╔════╝████╗ ████║██╔══██╗╚══██╔══╝██╔════╝██║  ██║
██████╔╝██████╔╝██║██║     █████╗  ██╔████╔██║███████║   ██║   ██║     ███████║
██╔═══╝ ██╔══██╗██║██║     ██╔══╝  ██║╚██╔╝██║██╔══██║   ██║   ██║     ██╔══██║
██║     ██║  ██║██║╚██████╗███████╗██║ ╚═╝ ██║██║  ██║   ██║   ╚██████╗██║  ██║
╚═╝     ╚═╝  ╚═╝╚═╝ ╚═════╝╚══════╝╚═╝     ╚═╝╚═╝  ╚═╝   ╚═╝    ╚═════╝╚═╝  ╚═╝

        CATALOG IN. PRICES OUT.
                                        AGPL-3.0
"#
    );

    if std::env::args().any(|arg| arg == "--health-check") {
        std::process::exit(run_health_check());
    }

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = Config::from_env()?;
    config.validate()?;
    let addr: SocketAddr = config.socket_addr().parse()?;

    tracing::info!(
        bind_addr = %config.bind_addr,
        port = config.port,
        collection = %config.collection_name,
        rerank = config.rerank_enabled,
        "Pricematch starting"
    );

    let index = QdrantCatalogIndex::new(&config.qdrant_url).await?;

    if config.gemini_api_key.is_none() {
        tracing::warn!(
            "No PRICEMATCH_GEMINI_API_KEY configured, extraction and embedding will fail until one is set"
        );
    }

    let extractor = GeminiVisionExtractor::new(
        config.gemini_api_key.clone(),
        Some(config.extraction_model.clone()),
        Duration::from_secs(config.request_timeout_secs),
    );

    let embedder = GeminiEmbedder::new(
        config.gemini_api_key.clone(),
        Some(config.embedding_model.clone()),
        Duration::from_secs(config.request_timeout_secs),
        config.max_retries,
    );

    let reranker = config
        .rerank_enabled
        .then(|| LlmReranker::new(genai::Client::default(), config.rerank_model.clone()));

    let pipeline_config = PipelineConfig::new()
        .with_collection_name(config.collection_name.clone())
        .with_search_limit(config.search_limit)
        .with_score_threshold(config.score_threshold)
        .with_min_match_score(config.min_match_score)
        .with_rerank_enabled(config.rerank_enabled);

    let pipeline = CatalogPipeline::new(extractor, embedder, index, reranker, pipeline_config)?;

    pipeline.ensure_collection().await?;
    tracing::info!(collection = %config.collection_name, "Catalog collection ready");

    let state = HandlerState::new(Arc::new(pipeline));
    let app = create_router_with_state(state);

    let listener = TcpListener::bind(addr).await?;
    tracing::info!(addr = %addr, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Pricematch shutdown complete");
    Ok(())
}

fn run_health_check() -> i32 {
    let port = std::env::var("PRICEMATCH_PORT")
        .ok()
        .and_then(|p| p.parse::<u16>().ok())
        .unwrap_or(8080);

    let url = format!("http://127.0.0.1:{}/healthz", port);

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("failed to build runtime");

    rt.block_on(async {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(1))
            .build()
            .expect("failed to build client");

        match client.get(&url).send().await {
            Ok(res) if res.status().is_success() => 0,
            _ => 1,
        }
    })
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
