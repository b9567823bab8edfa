//! 클러스터 API 세션.
//!
//! `ClusterApi` 포트 구현. 신원 확인 호출로 세션을 만들고, 이후 호출은
//! 200이 아닌 응답에 대해서만 제한된 횟수로 재시도한다.

use async_trait::async_trait;
use emcisi_core::config::HttpConfig;
use emcisi_core::error::{CallError, ConnectError};
use emcisi_core::extract::Document;
use emcisi_core::models::cluster::{ClusterEndpoint, ClusterIdentity, Credentials};
use emcisi_core::ports::cluster_api::{paths, ClusterApi};
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::StatusCode;
use std::time::Duration;
use tracing::{debug, info, warn};

/// 재시도 대기 상한
const MAX_BACKOFF: Duration = Duration::from_secs(30);

/// 인증된 클러스터 세션 — `ClusterApi` 포트 구현
pub struct IsiSession {
    client: reqwest::Client,
    endpoint: ClusterEndpoint,
    credentials: Credentials,
    identity: ClusterIdentity,
    error_count: u64,
    retry_backoff: Duration,
}

impl IsiSession {
    /// 신원 확인 없이 세션 생성
    ///
    /// 신원은 비어 있는 상태로 시작한다. 보통은 [`IsiSession::connect`]를 사용한다.
    pub fn new(
        credentials: Credentials,
        endpoint: ClusterEndpoint,
        http: &HttpConfig,
    ) -> Result<Self, CallError> {
        let client = reqwest::Client::builder()
            .danger_accept_invalid_certs(http.accept_invalid_certs)
            .connect_timeout(http.connector_timeout())
            .tcp_keepalive(http.tcp_keepalive())
            .pool_idle_timeout(http.pool_idle_timeout())
            .timeout(http.request_timeout())
            .build()
            .map_err(|e| CallError::Client(e.to_string()))?;

        Ok(Self {
            client,
            endpoint,
            credentials,
            identity: ClusterIdentity::default(),
            error_count: 0,
            retry_backoff: http.retry_backoff(),
        })
    }

    /// 신원 확인 호출까지 마친 세션 생성
    ///
    /// `/platform/1/cluster/config`를 `identity_retries` 재시도 예산으로 호출하고
    /// 클러스터 이름, 버전, 노드 수를 채운다.
    pub async fn connect(
        credentials: Credentials,
        endpoint: ClusterEndpoint,
        http: &HttpConfig,
    ) -> Result<Self, ConnectError> {
        let address = endpoint.to_string();
        let connect_error = |source| ConnectError {
            address: address.clone(),
            source,
        };

        let mut session = Self::new(credentials, endpoint, http).map_err(connect_error)?;
        session
            .confirm_identity(http.identity_retries)
            .await
            .map_err(connect_error)?;

        info!(
            "클러스터 연결: {} (이름={}, 버전={}, 노드={})",
            address, session.identity.name, session.identity.version, session.identity.node_count
        );
        Ok(session)
    }

    async fn confirm_identity(&mut self, max_retries: u32) -> Result<(), CallError> {
        let body = self.call(paths::CLUSTER_CONFIG, max_retries).await?;
        let doc = Document::parse(&body);

        self.identity = ClusterIdentity {
            name: doc.get("name").as_string(),
            version: doc.get("onefs_version.release").as_string(),
            node_count: doc.get("devices.#").as_i64(),
        };
        Ok(())
    }

    /// 인증 헤더가 포함된 GET 요청 빌더
    fn authorized_get(&self, url: &str) -> reqwest::RequestBuilder {
        self.client
            .get(url)
            .basic_auth(&self.credentials.username, Some(self.credentials.password()))
            .header(ACCEPT, "application/json")
            .header(CONTENT_TYPE, "application/json")
    }
}

#[async_trait]
impl ClusterApi for IsiSession {
    fn endpoint(&self) -> &ClusterEndpoint {
        &self.endpoint
    }

    fn identity(&self) -> &ClusterIdentity {
        &self.identity
    }

    async fn call(&mut self, path: &str, max_retries: u32) -> Result<String, CallError> {
        let url = self.endpoint.url_for(path);
        let mut delay = self.retry_backoff;
        let mut attempts: u32 = 0;

        loop {
            attempts += 1;
            debug!("API 호출: {url} (시도 {attempts}/{})", max_retries + 1);

            let resp = self
                .authorized_get(&url)
                .send()
                .await
                .map_err(|e| CallError::Transport(format!("{path}: {e}")))?;

            let status = resp.status();
            if status == StatusCode::OK {
                return resp
                    .text()
                    .await
                    .map_err(|e| CallError::Transport(format!("{path} 본문 읽기 실패: {e}")));
            }

            if attempts > max_retries {
                return Err(CallError::Status {
                    path: path.to_string(),
                    status: status.as_u16(),
                    attempts,
                });
            }

            self.error_count += 1;
            warn!(
                "비정상 응답 {status} ({path}), 재시도 {attempts}/{max_retries} (누적 에러 {})",
                self.error_count
            );

            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
                delay = (delay * 2).min(MAX_BACKOFF);
            }
        }
    }

    fn error_count(&self) -> u64 {
        self.error_count
    }
}
