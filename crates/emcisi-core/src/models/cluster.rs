//! 클러스터 주소, 자격증명, 신원 모델.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::CoreError;

/// 관리 API 주소.
///
/// 생성 후 변경되지 않는다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterEndpoint {
    scheme: String,
    host: String,
    port: u16,
}

impl ClusterEndpoint {
    /// HTTPS 관리 주소 생성
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            scheme: "https".to_string(),
            host: host.into(),
            port,
        }
    }

    /// 스크레이프 대상 문자열 해석
    ///
    /// - `10.0.0.5`, `isi.example` → `https://<host>:<mgmt_port>`
    /// - `isi.example:8443` → 명시된 포트 사용
    /// - `https://isi.example` 처럼 `://`가 있으면 URL로 파싱 (스킴 유지)
    pub fn from_target(target: &str, mgmt_port: u16) -> Result<Self, CoreError> {
        let target = target.trim();
        if target.is_empty() {
            return Err(CoreError::Config("대상 주소가 비어 있음".to_string()));
        }

        let parsed = if target.contains("://") {
            Url::parse(target)
        } else {
            Url::parse(&format!("https://{target}"))
        }
        .map_err(|e| CoreError::Config(format!("잘못된 대상 주소 '{target}': {e}")))?;

        let host = parsed
            .host_str()
            .filter(|h| !h.is_empty())
            .ok_or_else(|| CoreError::Config(format!("호스트 이름 없음: '{target}'")))?;

        Ok(Self {
            scheme: parsed.scheme().to_string(),
            host: host.to_string(),
            port: parsed.port().unwrap_or(mgmt_port),
        })
    }

    /// URL 스킴 (`https`, 테스트에서는 `http`)
    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    /// 호스트 이름 또는 IP
    pub fn host(&self) -> &str {
        &self.host
    }

    /// 관리 포트
    pub fn port(&self) -> u16 {
        self.port
    }

    /// API 경로의 전체 URL
    pub fn url_for(&self, path: &str) -> String {
        format!("{}://{}:{}{}", self.scheme, self.host, self.port, path)
    }
}

impl std::fmt::Display for ClusterEndpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// API 자격증명 (Basic 인증)
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    /// 사용자 이름
    pub username: String,
    password: String,
}

impl Credentials {
    /// 자격증명 생성
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// 비밀번호 (요청 헤더 구성에만 사용)
    pub fn password(&self) -> &str {
        &self.password
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// 클러스터 신원 — 신원 확인 호출(`/platform/1/cluster/config`) 성공 시 채워진다
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterIdentity {
    /// 클러스터 이름 (`name`)
    pub name: String,
    /// OneFS 버전 (`onefs_version.release`)
    pub version: String,
    /// 노드 수 (`devices.#`)
    pub node_count: i64,
}

impl ClusterIdentity {
    /// 아직 채워지지 않았는지 여부
    pub fn is_empty(&self) -> bool {
        self.name.is_empty() && self.version.is_empty() && self.node_count == 0
    }
}
