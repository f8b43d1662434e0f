//! 可观测性模块
//!
//! 提供指标、结构化日志和健康检查。

use axum::{
    Json, Router,
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
    routing::get,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};

// ===== Simple Metrics (using atomics for zero-dep implementation) =====

/// 简单应用指标
#[derive(Default)]
pub struct AppMetrics {
    pub http_requests_total: AtomicU64,
    pub http_request_duration_sum: AtomicU64,
    pub active_connections: AtomicUsize,
    pub chat_requests_total: AtomicU64,
    pub chat_latency_sum: AtomicU64,
    pub errors_total: AtomicU64,
}

impl AppMetrics {
    /// 记录 HTTP 请求
    pub fn record_http_request(&self, duration_ms: u64) {
        self.http_requests_total.fetch_add(1, Ordering::SeqCst);
        self.http_request_duration_sum
            .fetch_add(duration_ms, Ordering::SeqCst);
    }

    /// 记录活跃连接
    pub fn record_connection(&self, delta: isize) {
        if delta >= 0 {
            self.active_connections
                .fetch_add(delta as usize, Ordering::SeqCst);
        } else {
            self.active_connections
                .fetch_sub(delta.unsigned_abs(), Ordering::SeqCst);
        }
    }

    /// 记录问答请求
    pub fn record_chat(&self, duration_ms: u64) {
        self.chat_requests_total.fetch_add(1, Ordering::SeqCst);
        self.chat_latency_sum.fetch_add(duration_ms, Ordering::SeqCst);
    }

    /// 记录错误
    pub fn record_error(&self) {
        self.errors_total.fetch_add(1, Ordering::SeqCst);
    }

    /// 生成 Prometheus 格式指标
    pub fn gather(&self) -> String {
        format!(
            r#"# HELP http_requests_total Total HTTP requests
# TYPE http_requests_total counter
http_requests_total {}
# HELP http_request_duration_seconds HTTP request duration in seconds
# TYPE http_request_duration_seconds histogram
http_request_duration_seconds_sum {}
http_request_duration_seconds_count {}
# HELP active_connections Active HTTP connections
# TYPE active_connections gauge
active_connections {}
# HELP chat_requests_total Total tutoring chat requests
# TYPE chat_requests_total counter
chat_requests_total {}
# HELP chat_latency_seconds Chat request latency in seconds
# TYPE chat_latency_seconds histogram
chat_latency_seconds_sum {}
chat_latency_seconds_count {}
# HELP errors_total Total errors
# TYPE errors_total counter
errors_total {}
"#,
            self.http_requests_total.load(Ordering::SeqCst),
            self.http_request_duration_sum.load(Ordering::SeqCst) as f64 / 1000.0,
            self.http_requests_total.load(Ordering::SeqCst),
            self.active_connections.load(Ordering::SeqCst),
            self.chat_requests_total.load(Ordering::SeqCst),
            self.chat_latency_sum.load(Ordering::SeqCst) as f64 / 1000.0,
            self.chat_requests_total.load(Ordering::SeqCst),
            self.errors_total.load(Ordering::SeqCst),
        )
    }
}

// ===== Health Check =====

/// 健康检查状态
#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: String,
    pub timestamp: String,
    pub version: String,
    pub uptime_seconds: f64,
    pub initialized: bool,
}

/// 应用状态（用于健康检查）
pub struct ObservabilityState {
    pub metrics: AppMetrics,
    pub start_time: DateTime<Utc>,
    pub version: String,
    ready: AtomicBool,
}

impl ObservabilityState {
    pub fn new(version: String) -> Self {
        Self {
            metrics: AppMetrics::default(),
            start_time: Utc::now(),
            version,
            ready: AtomicBool::new(false),
        }
    }

    /// 标记服务已就绪（导师系统完成引导后调用）
    pub fn mark_ready(&self) {
        self.ready.store(true, Ordering::SeqCst);
    }

    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }

    /// 获取应用正常运行时间
    pub fn uptime_seconds(&self) -> f64 {
        (Utc::now() - self.start_time).num_seconds() as f64
    }
}

// ===== Health Check Handlers =====

/// 获取完整健康状态
pub async fn health_check(
    State(state): State<Arc<ObservabilityState>>,
) -> impl IntoResponse {
    let initialized = state.is_ready();

    let health_status = HealthStatus {
        status: if initialized {
            "healthy".to_string()
        } else {
            "starting".to_string()
        },
        timestamp: Utc::now().to_rfc3339(),
        version: state.version.clone(),
        uptime_seconds: state.uptime_seconds(),
        initialized,
    };

    Json(health_status)
}

/// 简单存活检查
pub async fn liveness() -> impl IntoResponse {
    "OK"
}

/// 就绪检查（导师系统引导完成后才就绪）
pub async fn readiness(State(state): State<Arc<ObservabilityState>>) -> impl IntoResponse {
    if state.is_ready() {
        (axum::http::StatusCode::OK, "Ready")
    } else {
        (axum::http::StatusCode::SERVICE_UNAVAILABLE, "Not Ready")
    }
}

/// Prometheus 指标端点
pub async fn metrics(State(state): State<Arc<ObservabilityState>>) -> impl IntoResponse {
    let output = state.metrics.gather();
    (axum::http::StatusCode::OK, output)
}

/// 版本信息端点
pub async fn version(State(state): State<Arc<ObservabilityState>>) -> impl IntoResponse {
    Json(serde_json::json!({
        "version": state.version,
        "uptime_seconds": state.uptime_seconds(),
        "timestamp": Utc::now().to_rfc3339(),
    }))
}

/// 创建可观测性路由
pub fn create_observability_router(state: Arc<ObservabilityState>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/health/live", get(liveness))
        .route("/health/ready", get(readiness))
        .route("/metrics", get(metrics))
        .route("/version", get(version))
        .with_state(state)
}

// ===== Structured Logging =====

/// 初始化结构化日志
pub fn init_tracing(service_name: &str) {
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| format!("info,{}", service_name));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .with_line_number(true)
        .finish();

    if tracing::subscriber::set_global_default(subscriber).is_err() {
        // 已有全局 subscriber（例如测试环境），忽略
    }
}

// ===== Request Metrics Middleware =====

/// 记录请求指标的中间件
pub async fn metrics_middleware(
    State(state): State<Arc<ObservabilityState>>,
    req: Request,
    next: Next,
) -> Response {
    let start = std::time::Instant::now();

    state.metrics.record_connection(1);

    let response = next.run(req).await;

    let duration_ms = start.elapsed().as_millis() as u64;
    state.metrics.record_http_request(duration_ms);
    state.metrics.record_connection(-1);

    if response.status().is_server_error() {
        state.metrics.record_error();
    }

    response
}
