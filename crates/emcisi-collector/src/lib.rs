//! # emcisi-collector
//!
//! 스크레이프 사이클 상태 머신과 응답 → 메트릭 변환.
//!
//! ## 구조
//!
//! - [`state`] — 사이클 상태와 단일 전이 함수
//! - [`steps`] — 단계별 응답 본문에서 메트릭 샘플 도출
//! - [`collector`] — `ClusterApi` 세션으로 한 사이클을 실행하는 수집기

pub mod collector;
pub mod state;
pub mod steps;

pub use collector::{ClusterCollector, ScrapeReport};
pub use state::{CycleState, ScrapeStep, StepOutcome};
