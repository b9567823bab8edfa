//! # emcisi-app
//!
//! emcisi 익스포터 바이너리 진입점.
//! CLI/환경변수/설정 파일 병합, 로깅 초기화, 스크레이프 모드 선택, 서버 라이프사이클.

mod shutdown;

use anyhow::{Context, Result};
use clap::Parser;
use emcisi_collector::ClusterCollector;
use emcisi_core::config::AppConfig;
use emcisi_core::models::cluster::{ClusterEndpoint, Credentials};
use emcisi_core::models::metric::MetricCatalog;
use emcisi_core::ports::cluster_api::ClusterApi;
use emcisi_network::session::IsiSession;
use emcisi_web::{AppState, BuildInfo, ExporterMetrics, MultiTarget, ScrapeMode, WebServer};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use crate::shutdown::ShutdownSignal;

/// 빌드 버전
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// 빌드 커밋 (빌드 시 `EMCISI_COMMIT`으로 주입)
const COMMIT: &str = match option_env!("EMCISI_COMMIT") {
    Some(commit) => commit,
    None => "unset",
};

/// 빌드에 쓴 rustc 버전 (build.rs)
const RUSTC_VERSION: &str = env!("EMCISI_RUSTC_VERSION");

/// 로그 필터를 적용할 대상
const LOG_TARGETS: [&str; 6] = [
    "emcisi_exporter",
    "emcisi_core",
    "emcisi_network",
    "emcisi_collector",
    "emcisi_web",
    "tower_http",
];

/// Dell EMC Isilon / OneFS Prometheus 익스포터
///
/// 모든 옵션은 `ISIENV_` 환경변수로도 지정할 수 있다.
#[derive(Parser, Debug)]
#[command(name = "emcisi-exporter")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// 설정 파일 경로 (toml, yaml, json)
    #[arg(long, env = "ISIENV_CONFIG")]
    config: Option<PathBuf>,

    /// API 사용자 이름
    #[arg(long, env = "ISIENV_USERNAME")]
    username: Option<String>,

    /// API 비밀번호
    #[arg(long, env = "ISIENV_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    /// 관리 API 포트 (기본: 8080)
    #[arg(long = "mgmtport", env = "ISIENV_MGMTPORT")]
    mgmt_port: Option<u16>,

    /// 단일 대상 모드의 클러스터 URL (예: https://my-isilon.example)
    #[arg(long, env = "ISIENV_URL")]
    url: Option<String>,

    /// 바인드 주소 (기본: localhost)
    #[arg(long = "bindaddress", env = "ISIENV_BINDADDRESS")]
    bind_address: Option<String>,

    /// 바인드 포트 (기본: 9437)
    #[arg(long = "bindport", env = "ISIENV_BINDPORT")]
    bind_port: Option<u16>,

    /// 다중 대상 모드 (`/query?target=`)
    #[arg(long, env = "ISIENV_MULTI")]
    multi: bool,

    /// 디버그 로그 활성화 (`--log-level debug`와 같음)
    #[arg(long, env = "ISIENV_DEBUG")]
    debug: bool,

    /// 로그 레벨 (trace, debug, info, warn, error)
    #[arg(long, short = 'l', env = "ISIENV_LOG_LEVEL")]
    log_level: Option<String>,
}

impl Args {
    /// 지정된 옵션만 설정에 덮어쓴다
    fn apply(&self, config: &mut AppConfig) {
        if let Some(username) = &self.username {
            config.isilon.username = username.clone();
        }
        if let Some(password) = &self.password {
            config.isilon.password = password.clone();
        }
        if let Some(port) = self.mgmt_port {
            config.isilon.mgmt_port = port;
        }
        if let Some(url) = &self.url {
            config.isilon.url = url.clone();
        }
        if let Some(address) = &self.bind_address {
            config.exporter.bind_address = address.clone();
        }
        if let Some(port) = self.bind_port {
            config.exporter.bind_port = port;
        }
        if self.multi {
            config.exporter.multi_query = true;
        }
        if let Some(level) = &self.log_level {
            config.exporter.log_level = level.clone();
        }
        if self.debug {
            config.exporter.log_level = "debug".to_string();
        }
    }
}

/// 워크스페이스 crate별 로그 필터 문자열
fn log_filter(level: &str) -> String {
    LOG_TARGETS
        .iter()
        .map(|target| format!("{target}={level}"))
        .collect::<Vec<_>>()
        .join(",")
}

/// 스크레이프 모드 준비
///
/// 단일 대상 모드는 여기서 클러스터에 연결한다. 실패하면 프로세스를 종료한다.
async fn prepare_mode(config: &AppConfig) -> Result<ScrapeMode> {
    let credentials = Credentials::new(
        config.isilon.username.clone(),
        config.isilon.password.clone(),
    );

    if config.exporter.multi_query {
        info!("다중 대상 모드로 실행");
        return Ok(ScrapeMode::Multi(Arc::new(MultiTarget {
            credentials,
            http: config.http.clone(),
            mgmt_port: config.isilon.mgmt_port,
        })));
    }

    info!("단일 대상 모드로 실행");
    let endpoint = ClusterEndpoint::from_target(&config.isilon.url, config.isilon.mgmt_port)
        .context("클러스터 URL 해석 실패")?;
    info!("클러스터 연결: {endpoint}");

    let session = IsiSession::connect(credentials, endpoint, &config.http)
        .await
        .context("클러스터에 연결할 수 없음")?;
    debug!(
        "클러스터 버전 {}, 노드 {}개",
        session.identity().version,
        session.identity().node_count
    );

    let session: Box<dyn ClusterApi> = Box::new(session);
    Ok(ScrapeMode::Single(Arc::new(Mutex::new(session))))
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = AppConfig::load(args.config.as_deref()).context("설정 로드 실패")?;
    args.apply(&mut config);

    let log_filter = log_filter(&config.exporter.log_level);
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log_filter)),
        )
        .init();

    info!("emcisi 익스포터 시작 (version {VERSION}, commit {COMMIT}, rustc {RUSTC_VERSION})");
    debug!("설정: {config:?}");
    config.validate()?;

    let build = BuildInfo {
        version: VERSION,
        commit: COMMIT,
        rustc: RUSTC_VERSION,
    };
    let namespace = config.exporter.namespace.as_str();
    let state = AppState {
        catalog: Arc::new(MetricCatalog::new(namespace)),
        collector: Arc::new(ClusterCollector::new(config.http.call_retries)),
        exporter: Arc::new(ExporterMetrics::new(namespace, build)?),
        mode: prepare_mode(&config).await?,
    };

    let shutdown = ShutdownSignal::install().context("시그널 핸들러 설치 실패")?;
    let server = WebServer::new(&config.exporter, state);
    info!("수신 주소: {}", server.bind_address());

    server
        .run(shutdown.wait())
        .await
        .with_context(|| format!("{}에서 서버 실행 실패", config.exporter.bind_address))?;

    info!("emcisi 익스포터 종료");
    Ok(())
}
