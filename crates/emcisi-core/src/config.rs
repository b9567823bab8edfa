//! 애플리케이션 설정 구조체.
//!
//! 클러스터 자격증명, 익스포터 바인드 주소, HTTP 타임아웃/재시도 설정을 정의한다.
//! 기본값 ← 설정 파일 ← `ISIENV_` 환경변수 순으로 `config` crate를 통해 로드하고,
//! CLI 인자는 바이너리에서 마지막에 덮어쓴다.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::debug;

use crate::error::CoreError;

/// 환경변수 접두사 (`ISIENV_EXPORTER__BIND_PORT` 형식)
pub const ENV_PREFIX: &str = "ISIENV";

/// 최상위 애플리케이션 설정
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// 클러스터 접속 설정
    #[serde(default)]
    pub isilon: IsilonConfig,
    /// 익스포터 서버 설정
    #[serde(default)]
    pub exporter: ExporterConfig,
    /// 원격 API HTTP 설정
    #[serde(default)]
    pub http: HttpConfig,
}

// ============================================================
// 클러스터 접속 설정
// ============================================================

/// 클러스터 접속 설정 — 자격증명과 관리 포트
#[derive(Clone, Serialize, Deserialize)]
pub struct IsilonConfig {
    /// API 사용자 이름
    #[serde(default = "default_username")]
    pub username: String,
    /// API 비밀번호
    #[serde(default = "default_password")]
    pub password: String,
    /// 관리 API 포트
    #[serde(default = "default_mgmt_port")]
    pub mgmt_port: u16,
    /// 단일 대상 모드의 관리 인터페이스 URL (예: `https://my-isilon.example`)
    #[serde(default)]
    pub url: String,
}

impl Default for IsilonConfig {
    fn default() -> Self {
        Self {
            username: default_username(),
            password: default_password(),
            mgmt_port: default_mgmt_port(),
            url: String::new(),
        }
    }
}

// 비밀번호는 로그에 남기지 않는다
impl std::fmt::Debug for IsilonConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IsilonConfig")
            .field("username", &self.username)
            .field("password", &"***")
            .field("mgmt_port", &self.mgmt_port)
            .field("url", &self.url)
            .finish()
    }
}

fn default_username() -> String {
    "defaultUser".to_string()
}

fn default_password() -> String {
    "defaultPass".to_string()
}

fn default_mgmt_port() -> u16 {
    8080
}

// ============================================================
// 익스포터 서버 설정
// ============================================================

/// 익스포터 서버 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExporterConfig {
    /// 바인드 주소
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
    /// 바인드 포트
    #[serde(default = "default_bind_port")]
    pub bind_port: u16,
    /// 로그 레벨 (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// 다중 대상 모드 (`/query?target=` 엔드포인트 활성화)
    #[serde(default)]
    pub multi_query: bool,
    /// 메트릭 네임스페이스 접두사
    #[serde(default = "default_namespace")]
    pub namespace: String,
}

impl Default for ExporterConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            bind_port: default_bind_port(),
            log_level: default_log_level(),
            multi_query: false,
            namespace: default_namespace(),
        }
    }
}

fn default_bind_address() -> String {
    "localhost".to_string()
}

fn default_bind_port() -> u16 {
    9437
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_namespace() -> String {
    "emcisi".to_string()
}

// ============================================================
// HTTP 설정
// ============================================================

/// 원격 API HTTP 설정 — 타임아웃, TLS, 재시도 예산
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// TCP 연결 타임아웃 (초)
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    /// TLS 핸드셰이크 타임아웃 (초)
    #[serde(default = "default_tls_handshake_timeout")]
    pub tls_handshake_timeout_secs: u64,
    /// TCP keep-alive 간격 (초)
    #[serde(default = "default_keepalive")]
    pub tcp_keepalive_secs: u64,
    /// 유휴 커넥션 유지 시간 (초)
    #[serde(default = "default_keepalive")]
    pub pool_idle_timeout_secs: u64,
    /// 요청 전체 타임아웃 (초)
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
    /// 서버 인증서 검증 생략 (클러스터는 보통 자체 서명 인증서 사용)
    #[serde(default = "default_true")]
    pub accept_invalid_certs: bool,
    /// 신원 확인 호출 재시도 횟수
    #[serde(default = "default_identity_retries")]
    pub identity_retries: u32,
    /// 수집 단계 호출 재시도 횟수
    #[serde(default = "default_call_retries")]
    pub call_retries: u32,
    /// HTTP 재시도 간 대기 (밀리초, 0이면 즉시 재시도)
    #[serde(default)]
    pub retry_backoff_ms: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: default_connect_timeout(),
            tls_handshake_timeout_secs: default_tls_handshake_timeout(),
            tcp_keepalive_secs: default_keepalive(),
            pool_idle_timeout_secs: default_keepalive(),
            request_timeout_secs: default_request_timeout(),
            accept_invalid_certs: true,
            identity_retries: default_identity_retries(),
            call_retries: default_call_retries(),
            retry_backoff_ms: 0,
        }
    }
}

impl HttpConfig {
    /// 커넥터 타임아웃 — TCP 연결과 TLS 핸드셰이크를 합친 상한
    pub fn connector_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs + self.tls_handshake_timeout_secs)
    }

    /// TCP keep-alive 간격
    pub fn tcp_keepalive(&self) -> Duration {
        Duration::from_secs(self.tcp_keepalive_secs)
    }

    /// 유휴 커넥션 유지 시간
    pub fn pool_idle_timeout(&self) -> Duration {
        Duration::from_secs(self.pool_idle_timeout_secs)
    }

    /// 요청 전체 타임아웃
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// 첫 재시도 대기 시간
    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }
}

fn default_connect_timeout() -> u64 {
    30
}

fn default_tls_handshake_timeout() -> u64 {
    10
}

fn default_keepalive() -> u64 {
    30
}

fn default_request_timeout() -> u64 {
    60
}

fn default_true() -> bool {
    true
}

fn default_identity_retries() -> u32 {
    2
}

fn default_call_retries() -> u32 {
    1
}

// ============================================================
// 로드 / 검증
// ============================================================

impl AppConfig {
    /// 설정 파일(선택)과 `ISIENV_` 환경변수로부터 설정 로드
    ///
    /// 파일 형식은 확장자로 결정된다 (toml, json, yaml 등).
    /// 중첩 키는 `__`로 구분한다: `ISIENV_HTTP__CALL_RETRIES=3`.
    pub fn load(path: Option<&Path>) -> Result<Self, CoreError> {
        let mut builder = config::Config::builder();

        if let Some(path) = path {
            debug!("설정 파일 로드: {}", path.display());
            builder = builder.add_source(config::File::from(path).required(true));
        }

        builder = builder.add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config: AppConfig = builder.build()?.try_deserialize()?;
        Ok(config)
    }

    /// 설정값 검증
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.isilon.mgmt_port == 0 {
            return Err(CoreError::Config("관리 포트는 0일 수 없음".to_string()));
        }
        if !self.exporter.multi_query && self.isilon.url.trim().is_empty() {
            return Err(CoreError::Config(
                "단일 대상 모드에는 클러스터 URL이 필요함 (--url)".to_string(),
            ));
        }
        if self.exporter.namespace.trim().is_empty() {
            return Err(CoreError::Config(
                "메트릭 네임스페이스가 비어 있음".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn config_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.isilon.username, "defaultUser");
        assert_eq!(config.isilon.mgmt_port, 8080);
        assert_eq!(config.exporter.bind_port, 9437);
        assert_eq!(config.exporter.bind_address, "localhost");
        assert!(!config.exporter.multi_query);
        assert_eq!(config.exporter.namespace, "emcisi");
        assert_eq!(config.http.identity_retries, 2);
        assert_eq!(config.http.call_retries, 1);
        assert!(config.http.accept_invalid_certs);
        assert_eq!(config.http.connector_timeout(), Duration::from_secs(40));
        assert_eq!(config.http.tcp_keepalive(), Duration::from_secs(30));
    }

    #[test]
    fn password_not_in_debug_output() {
        let mut config = IsilonConfig::default();
        config.password = "s3cr3t".to_string();
        let debug = format!("{config:?}");
        assert!(!debug.contains("s3cr3t"));
        assert!(debug.contains("***"));
    }

    #[test]
    fn validate_single_mode_requires_url() {
        let mut config = AppConfig::default();
        assert!(config.validate().is_err());

        config.isilon.url = "https://cluster.example".to_string();
        assert!(config.validate().is_ok());

        config.isilon.url.clear();
        config.exporter.multi_query = true;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn validate_rejects_zero_port() {
        let mut config = AppConfig::default();
        config.exporter.multi_query = true;
        config.isilon.mgmt_port = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("관리 포트"));
    }

    #[test]
    fn load_from_toml_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("exporter.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            "[isilon]\nusername = \"monitor\"\nmgmt_port = 8443\n\n[http]\ncall_retries = 3"
        )
        .unwrap();

        let config = AppConfig::load(Some(&path)).unwrap();
        assert_eq!(config.isilon.username, "monitor");
        assert_eq!(config.isilon.mgmt_port, 8443);
        assert_eq!(config.isilon.password, "defaultPass");
        assert_eq!(config.http.call_retries, 3);
        assert_eq!(config.http.identity_retries, 2);
    }

    #[test]
    fn load_missing_file_fails() {
        let result = AppConfig::load(Some(Path::new("/nonexistent/emcisi.toml")));
        assert!(matches!(result, Err(CoreError::Config(_))));
    }
}
