//! # emcisi-web
//!
//! Prometheus 노출 HTTP 서버.
//! Axum 기반으로 스크레이프 요청을 받아 수집 사이클을 실행하고 텍스트 포맷으로 응답한다.
//!
//! ## 모드
//! - 단일 대상: `/metrics`가 프로세스 수명 세션으로 한 사이클 실행
//! - 다중 대상: `/query?target=`이 요청마다 세션을 만들고, `/metrics`는 자체 메트릭만 노출

pub mod error;
pub mod exposition;
pub mod handlers;
pub mod metrics;
pub mod routes;

use axum::Router;
use emcisi_collector::ClusterCollector;
use emcisi_core::config::{ExporterConfig, HttpConfig};
use emcisi_core::models::cluster::Credentials;
use emcisi_core::models::metric::MetricCatalog;
use emcisi_core::ports::cluster_api::ClusterApi;
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::Mutex;
use tower_http::trace::TraceLayer;
use tracing::info;

pub use metrics::{BuildInfo, ExporterMetrics};

/// 프로세스 수명 세션 (동시 스크레이프는 잠금으로 직렬화)
pub type SharedSession = Arc<Mutex<Box<dyn ClusterApi>>>;

/// 다중 대상 모드 접속 설정
#[derive(Debug, Clone)]
pub struct MultiTarget {
    /// 모든 대상에 쓰는 자격증명
    pub credentials: Credentials,
    /// HTTP 타임아웃/재시도 설정
    pub http: HttpConfig,
    /// 대상에 포트가 없을 때 쓰는 관리 포트
    pub mgmt_port: u16,
}

/// 스크레이프 모드
#[derive(Clone)]
pub enum ScrapeMode {
    /// 단일 대상
    Single(SharedSession),
    /// 다중 대상
    Multi(Arc<MultiTarget>),
}

/// 웹 서버 애플리케이션 상태
#[derive(Clone)]
pub struct AppState {
    /// 메트릭 카탈로그
    pub catalog: Arc<MetricCatalog>,
    /// 수집기
    pub collector: Arc<ClusterCollector>,
    /// 자체 메트릭
    pub exporter: Arc<ExporterMetrics>,
    /// 스크레이프 모드
    pub mode: ScrapeMode,
}

/// 라우터 구성
pub fn build_router(state: AppState) -> Router {
    routes::routes(&state.mode)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// 익스포터 HTTP 서버
pub struct WebServer {
    bind: String,
    state: AppState,
}

impl WebServer {
    /// 새 웹 서버 생성
    pub fn new(config: &ExporterConfig, state: AppState) -> Self {
        Self {
            bind: format!("{}:{}", config.bind_address, config.bind_port),
            state,
        }
    }

    /// 바인드 주소
    pub fn bind_address(&self) -> &str {
        &self.bind
    }

    /// 서버 실행
    ///
    /// `shutdown`이 끝나면 진행 중인 요청을 마치고 반환한다.
    pub async fn run<F>(self, shutdown: F) -> Result<(), std::io::Error>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let app = build_router(self.state);
        let listener = TcpListener::bind(&self.bind).await?;
        info!("익스포터 서버 시작: http://{}", listener.local_addr()?);

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await?;

        info!("익스포터 서버 종료");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use emcisi_core::error::CallError;
    use emcisi_core::models::cluster::{ClusterEndpoint, ClusterIdentity};
    use tower::ServiceExt;

    const BUILD: BuildInfo = BuildInfo {
        version: "0.3.0",
        commit: "test",
        rustc: "1.85.0",
    };

    /// 모든 호출에 빈 객체를 돌려주는 세션
    struct EmptyCluster {
        endpoint: ClusterEndpoint,
        identity: ClusterIdentity,
    }

    #[async_trait]
    impl ClusterApi for EmptyCluster {
        fn endpoint(&self) -> &ClusterEndpoint {
            &self.endpoint
        }

        fn identity(&self) -> &ClusterIdentity {
            &self.identity
        }

        async fn call(&mut self, _path: &str, _max_retries: u32) -> Result<String, CallError> {
            Ok("{}".to_string())
        }

        fn error_count(&self) -> u64 {
            0
        }
    }

    fn state(mode: ScrapeMode) -> AppState {
        AppState {
            catalog: Arc::new(MetricCatalog::new("emcisi")),
            collector: Arc::new(ClusterCollector::new(1)),
            exporter: Arc::new(ExporterMetrics::new("emcisi", BUILD).unwrap()),
            mode,
        }
    }

    fn single_state() -> AppState {
        let session: Box<dyn ClusterApi> = Box::new(EmptyCluster {
            endpoint: ClusterEndpoint::new("10.0.0.5", 8080),
            identity: ClusterIdentity {
                name: "lab".to_string(),
                version: "9.1.0.0".to_string(),
                node_count: 3,
            },
        });
        state(ScrapeMode::Single(Arc::new(Mutex::new(session))))
    }

    fn multi_state() -> AppState {
        state(ScrapeMode::Multi(Arc::new(MultiTarget {
            credentials: Credentials::new("monitor", "pw"),
            http: HttpConfig::default(),
            mgmt_port: 8080,
        })))
    }

    async fn get(app: Router, uri: &str) -> (StatusCode, String) {
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, String::from_utf8(body.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn single_mode_metrics_runs_cycle() {
        let app = build_router(single_state());
        let (status, body) = get(app, "/metrics").await;

        assert_eq!(status, StatusCode::OK);
        assert!(body.contains(r#"emcisi_exporter_up{clustername="lab"} 1"#));
        assert!(body.contains(r#"emcisi_cluster_cpu_usage{clustername="lab"} 0"#));
        assert!(body.contains(
            r#"emcisi_cluster_version{clustername="lab",nodecount="3",version="9.1.0.0"} 1"#
        ));
        assert!(body.contains(r#"emcisi_exporter_scrapes_total{result="success"} 1"#));
        assert!(body.contains("emcisi_collector_build_info"));
        assert!(body.contains("emcisi_request_errors_total 0"));
    }

    #[tokio::test]
    async fn single_mode_has_no_query_route() {
        let (status, _) = get(build_router(single_state()), "/query?target=x").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn landing_pages_differ_by_mode() {
        let (_, body) = get(build_router(single_state()), "/").await;
        assert!(body.contains(r#"<a href="/metrics">"#));
        assert!(!body.contains("/query"));

        let (_, body) = get(build_router(multi_state()), "/").await;
        assert!(body.contains(r#"<form action="/query">"#));
    }

    #[tokio::test]
    async fn query_without_target_is_bad_request() {
        let (status, body) = get(build_router(multi_state()), "/query").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.contains("'target' parameter must be specified"));

        let (status, _) = get(build_router(multi_state()), "/query?target=").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn missing_target_counts_as_request_error() {
        let state = multi_state();
        let (status, _) = get(build_router(state.clone()), "/query").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let (status, _) = get(build_router(state.clone()), "/query?target=%20").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (_, body) = get(build_router(state), "/metrics").await;
        assert!(body.contains("emcisi_request_errors_total 2"), "{body}");
        // 사이클이 실행되지 않았으므로 스크레이프 횟수는 그대로
        assert!(body.contains(r#"emcisi_exporter_scrapes_total{result="failure"} 0"#));
    }

    #[tokio::test]
    async fn query_unreachable_target_reports_down() {
        let state = multi_state();
        let (status, body) = get(build_router(state.clone()), "/query?target=127.0.0.1:1").await;

        assert_eq!(status, StatusCode::OK);
        assert!(body.contains(r#"emcisi_exporter_up{clustername="127.0.0.1:1"} 0"#));
        assert!(body.contains("emcisi_collection_duration_seconds{clustername=\"127.0.0.1:1\"}"));
        assert!(!body.contains("emcisi_cluster_cpu_usage"));

        let (_, body) = get(build_router(state), "/metrics").await;
        assert!(body.contains(r#"emcisi_exporter_scrapes_total{result="failure"} 1"#));
        assert!(body.contains("emcisi_request_errors_total 1"));
        assert!(!body.contains("emcisi_exporter_up"));
    }

    #[test]
    fn web_server_bind_address() {
        let server = WebServer::new(&ExporterConfig::default(), multi_state());
        assert_eq!(server.bind_address(), "localhost:9437");
    }

    #[tokio::test]
    async fn run_returns_after_shutdown() {
        let config = ExporterConfig {
            bind_address: "127.0.0.1".to_string(),
            bind_port: 0,
            ..ExporterConfig::default()
        };
        let server = WebServer::new(&config, multi_state());
        server.run(async {}).await.unwrap();
    }

    #[tokio::test]
    async fn run_fails_on_bad_bind_address() {
        let config = ExporterConfig {
            bind_address: "256.0.0.1".to_string(),
            ..ExporterConfig::default()
        };
        let server = WebServer::new(&config, multi_state());
        assert!(server.run(std::future::pending::<()>()).await.is_err());
    }
}
