//! RuleGrid 规则服务
//!
//! 提供规则集上传与规则应用的 REST API。

use std::sync::Arc;

use axum::http::HeaderValue;
use rule_grid_service::{
    AppState, InMemoryRuleSetRepository, JsonWorkbookReader, PgRuleSetRepository,
    RuleEngineService, RuleSetRepository, routes,
};
use rulegrid_shared::{
    config::{AppConfig, StorageBackend},
    database::Database,
    observability,
};
use tokio::net::TcpListener;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info, warn};

const SERVICE_NAME: &str = "rule-grid";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load(SERVICE_NAME)?;

    let obs_config = config
        .observability
        .clone()
        .with_service_name(&config.service_name);
    let _guard = observability::init(&obs_config).await?;

    info!("Starting {} on {}", SERVICE_NAME, config.server_addr());

    let mut database = None;
    let repository: Arc<dyn RuleSetRepository> = match config.storage.backend {
        StorageBackend::Memory => {
            warn!("Using in-memory rule set storage, data is lost on restart");
            Arc::new(InMemoryRuleSetRepository::new())
        }
        StorageBackend::Postgres => {
            let db = Database::connect(&config.database)
                .await
                .inspect_err(|e| error!(code = e.code(), error = %e, "数据库连接失败"))?;
            let repository = PgRuleSetRepository::new(db.pool().clone());
            repository.ensure_schema().await?;
            database = Some(db);
            info!("Using PostgreSQL rule set storage");
            Arc::new(repository)
        }
    };

    let service = Arc::new(RuleEngineService::new(
        repository,
        Arc::new(JsonWorkbookReader::new()),
    ));
    let state = AppState::new(service);

    // RULEGRID_CORS_ORIGINS：逗号分隔的来源列表，或 "*"
    let allowed_origins = std::env::var("RULEGRID_CORS_ORIGINS").unwrap_or_else(|_| "*".to_string());
    let cors = if allowed_origins == "*" {
        if config.is_production() {
            warn!("RULEGRID_CORS_ORIGINS=\"*\" 在生产环境中不安全，请设置为具体域名");
        }
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        info!("CORS allowed_origins: {}", allowed_origins);
        let origins: Vec<_> = allowed_origins
            .split(',')
            .filter_map(|s| s.trim().parse::<HeaderValue>().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    };

    let app = routes::app(state, config.server.max_upload_bytes)
        .layer(CompressionLayer::new())
        .layer(cors);

    let listener = TcpListener::bind(config.server_addr()).await?;
    info!("Listening on {}", config.server_addr());

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(db) = database {
        db.close().await;
    }

    info!("Server shutdown complete");
    Ok(())
}

/// 监听关闭信号：Ctrl+C 或 SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "注册 Ctrl+C 处理器失败");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "注册 SIGTERM 处理器失败");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, initiating graceful shutdown..."),
        _ = terminate => info!("Received SIGTERM, initiating graceful shutdown..."),
    }
}
