//! 포트 인터페이스 (trait).
//!
//! 수집기(`emcisi-collector`)는 [`cluster_api::ClusterApi`]에만 의존하고,
//! 실제 HTTP 구현은 `emcisi-network`가 제공한다.
//! 모든 async trait은 `async_trait` 매크로를 사용한다.

pub mod cluster_api;
