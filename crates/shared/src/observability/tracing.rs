//! 日志订阅器
//!
//! `RUST_LOG` 优先于 `observability.log_level`；两者都无效时回退到 info。

use anyhow::{Context, Result};
use tracing_subscriber::{
    EnvFilter, Layer, Registry,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

use super::ObservabilityConfig;

fn env_filter(config: &ObservabilityConfig) -> EnvFilter {
    let directives = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    build_filter(directives.as_deref(), &config.log_level)
}

fn build_filter(directives: Option<&str>, log_level: &str) -> EnvFilter {
    directives
        .filter(|d| !d.trim().is_empty())
        .and_then(|d| EnvFilter::try_new(d).ok())
        .or_else(|| EnvFilter::try_new(log_level).ok())
        .unwrap_or_else(|| EnvFilter::new("info"))
}

/// json：每行一个事件，span 关闭时输出耗时；pretty：本地开发用
fn fmt_layer(config: &ObservabilityConfig) -> Box<dyn Layer<Registry> + Send + Sync> {
    if config.json_logs() {
        fmt::layer()
            .json()
            .with_current_span(true)
            .with_span_events(FmtSpan::CLOSE)
            .boxed()
    } else {
        fmt::layer().with_target(false).compact().boxed()
    }
}

/// 全局安装，进程内只能调用一次
pub fn init(config: &ObservabilityConfig) -> Result<()> {
    tracing_subscriber::registry()
        .with(fmt_layer(config))
        .with(env_filter(config))
        .try_init()
        .context("tracing subscriber 已安装")?;
    Ok(())
}
