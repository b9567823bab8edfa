//! # emcisi-network
//!
//! 클러스터 관리 API HTTP 어댑터.
//! Basic 인증 GET 요청과 비정상 응답 재시도를 담당하며
//! `emcisi_core::ports::cluster_api::ClusterApi` 포트를 구현한다.
//!
//! ## 사용 예시
//!
//! ```rust,ignore
//! use emcisi_network::session::IsiSession;
//!
//! let mut session = IsiSession::connect(credentials, endpoint, &config.http).await?;
//! let body = session.call(paths::SYSTEM_SUMMARY, 1).await?;
//! ```

pub mod session;
