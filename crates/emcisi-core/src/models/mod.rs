//! emcisi 도메인 모델.
//!
//! 클러스터 주소/신원과 메트릭 카탈로그를 정의한다.

pub mod cluster;
pub mod metric;
