//! # emcisi-core
//!
//! emcisi 도메인 모델, 포트(trait) 정의, 에러 타입, 필드 추출기.
//! 모든 크레이트가 공유하는 핵심 타입과 인터페이스를 제공한다.
//!
//! ## 구조
//!
//! - [`models`] — 클러스터 주소/신원, 메트릭 카탈로그와 샘플
//! - [`ports`] — 클러스터 API 포트 인터페이스 (async_trait)
//! - [`extract`] — JSON 경로 추출기
//! - [`error`] — 핵심 에러 타입 (thiserror)
//! - [`config`] — 애플리케이션 설정 구조체와 로더

pub mod config;
pub mod error;
pub mod extract;
pub mod models;
pub mod ports;
