//! Folio Articles API server binary

use std::net::SocketAddr;
use std::sync::Arc;

use articles_api::build_router;
use articles_api::config::Config;
use articles_api::state::AppState;
use axum::Router;
use folio_core::{FolioService, MokaQueryCache};
use folio_db::{ArticleRepository, PoolOptions, PrincipalRepository, Repositories};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use tokio::signal;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize logging
    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive("articles_api=debug".parse()?))
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Folio Articles API");

    // Load configuration
    let config = Config::from_env()?;
    tracing::info!(
        http_port = config.http_port,
        cache_ttl_secs = config.core.cache_ttl.as_secs(),
        "Configuration loaded"
    );

    // Initialize metrics
    let metrics_handle = if config.metrics_enabled {
        Some(setup_metrics()?)
    } else {
        None
    };

    // Create database pool
    let pool = folio_db::create_pool_with_options(
        &config.database_url,
        &PoolOptions {
            max_connections: config.db_max_connections,
            ..PoolOptions::default()
        },
    )
    .await?;
    tracing::info!("Database pool created");

    if config.run_migrations {
        folio_db::run_migrations(&pool).await?;
    }

    // Create repositories and the listing cache
    let repos = Repositories::new(pool.clone());
    let cache = Arc::new(MokaQueryCache::new(config.core.cache_max_entries));

    let principals: Arc<dyn PrincipalRepository> = Arc::new(repos.principals);
    let articles: Arc<dyn ArticleRepository> = Arc::new(repos.articles);

    let folio = FolioService::new(config.core.clone(), principals, articles, Arc::clone(&cache))?;

    let state = AppState::new(folio, cache, pool, config.clone());
    let app = build_router(state, metrics_handle);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.http_port));
    run_http_server(app, addr).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

async fn run_http_server(app: Router, addr: SocketAddr) -> anyhow::Result<()> {
    tracing::info!("HTTP server listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

fn setup_metrics() -> anyhow::Result<PrometheusHandle> {
    // Most listing reads are cache hits well under 10ms
    let latency_buckets = &[0.0005, 0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5];

    let handle = PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Full(folio_core::metrics::OPERATION_DURATION_SECONDS.to_string()),
            latency_buckets,
        )?
        .install_recorder()?;

    folio_core::metrics::describe_metrics();

    Ok(handle)
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
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}
