//! Prometheus 指标
//!
//! 记录器全局安装一次，`/metrics` 在独立端口上暴露。
//! 未安装记录器时（测试、metrics_enabled = false）各 `record_*` 函数为空操作。

use anyhow::{Context, Result};
use axum::{Router, routing::get};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::net::SocketAddr;
use tokio::{net::TcpListener, task::JoinHandle};
use tracing::{error, info};

use super::ObservabilityConfig;

/// (名称, 说明)
const COUNTERS: &[(&str, &str)] = &[
    ("http_requests_total", "HTTP requests by method, route and status"),
    ("rule_sets_uploaded_total", "Rule sets ingested and saved"),
    ("records_processed_total", "Records run through the apply endpoints"),
    ("rules_applied_total", "Rules whose actions were applied to a record"),
];

const GAUGES: &[(&str, &str)] = &[("rule_set_rule_count", "Real rules in a stored rule set")];

const HISTOGRAMS: &[(&str, &str)] = &[
    ("http_request_duration_seconds", "HTTP request latency"),
    ("rule_application_duration_seconds", "Latency of one apply request"),
];

/// 导出服务任务，随 ObservabilityGuard 一起释放
pub struct MetricsHandle {
    server: JoinHandle<()>,
}

impl Drop for MetricsHandle {
    fn drop(&mut self) {
        self.server.abort();
    }
}

pub async fn init(config: &ObservabilityConfig) -> Result<MetricsHandle> {
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .context("安装 Prometheus recorder 失败")?;

    for (name, help) in COUNTERS {
        metrics::describe_counter!(*name, *help);
    }
    for (name, help) in GAUGES {
        metrics::describe_gauge!(*name, *help);
    }
    for (name, help) in HISTOGRAMS {
        metrics::describe_histogram!(*name, *help);
    }
    metrics::counter!("service_starts_total", "service" => config.service_name.clone())
        .increment(1);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.metrics_port));
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("指标端口 {} 绑定失败", addr))?;
    info!(%addr, "Metrics server listening");

    Ok(MetricsHandle {
        server: tokio::spawn(serve(listener, handle)),
    })
}

async fn serve(listener: TcpListener, handle: PrometheusHandle) {
    let app = Router::new().route("/metrics", get(move || std::future::ready(handle.render())));
    if let Err(e) = axum::serve(listener, app).await {
        error!(error = %e, "Metrics server stopped");
    }
}

/// `route` 使用路由模板而非原始 URI，避免标签基数膨胀
pub fn record_http_request(method: &str, route: &str, status: u16, duration_secs: f64) {
    let labels = [
        ("method", method.to_string()),
        ("route", route.to_string()),
        ("status", status.to_string()),
    ];
    metrics::counter!("http_requests_total", &labels).increment(1);
    metrics::histogram!("http_request_duration_seconds", &labels).record(duration_secs);
}

/// 标签只取已保存的规则集数据，同一 id 重复上传覆盖同一条 gauge
pub fn record_rule_set_uploaded(rule_set_id: &str, class_name: &str, rule_count: usize) {
    metrics::counter!("rule_sets_uploaded_total", "class_name" => class_name.to_string())
        .increment(1);
    metrics::gauge!("rule_set_rule_count", "rule_set_id" => rule_set_id.to_string())
        .set(rule_count as f64);
}

/// 一次 apply 请求：处理的记录数、执行的规则数与耗时
///
/// 请求里的 className 来自调用方，不作为标签。
pub fn record_rule_application(
    path: &str,
    records: usize,
    rules_applied: usize,
    duration_secs: f64,
) {
    let labels = [("path", path.to_string())];
    metrics::counter!("records_processed_total", &labels).increment(records as u64);
    metrics::counter!("rules_applied_total", &labels).increment(rules_applied as u64);
    metrics::histogram!("rule_application_duration_seconds", &labels).record(duration_secs);
}
