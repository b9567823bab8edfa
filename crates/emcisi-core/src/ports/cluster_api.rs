//! 클러스터 관리 API 포트.
//!
//! 구현: `emcisi-network` crate (reqwest)

use async_trait::async_trait;

use crate::error::CallError;
use crate::models::cluster::{ClusterEndpoint, ClusterIdentity};

/// 관리 API 경로
pub mod paths {
    /// 신원 확인 (클러스터 이름, 버전, 노드 목록)
    pub const CLUSTER_CONFIG: &str = "/platform/1/cluster/config";

    /// 시스템 요약 통계
    pub const SYSTEM_SUMMARY: &str = "/platform/3/statistics/summary/system";

    /// /ifs 용량 통계
    pub const CAPACITY: &str = "/platform/1/statistics/current?key=ifs.bytes.total&key=ifs.ssd.bytes.total&key=ifs.bytes.free&key=ifs.ssd.bytes.free&key=ifs.bytes.avail&key=ifs.ssd.bytes.avail&devid=all";

    /// 드라이브 요약 통계
    pub const DRIVE_SUMMARY: &str = "/platform/3/statistics/summary/drive";

    /// 미해결 이벤트 그룹
    pub const ALERTS: &str =
        "/platform/3/event/eventgroup-occurrences?resolved=false&ignore=false";

    /// 쿼터 목록
    pub const QUOTAS: &str = "/platform/1/quota/quotas";
}

/// 인증된 클러스터 세션.
///
/// 한 번에 한 스크레이프만 사용한다 (`call`이 `&mut self`).
#[async_trait]
pub trait ClusterApi: Send {
    /// 대상 주소
    fn endpoint(&self) -> &ClusterEndpoint;

    /// 신원 확인 호출로 채워진 클러스터 신원
    fn identity(&self) -> &ClusterIdentity;

    /// 인증된 GET 요청
    ///
    /// 200 응답의 본문을 돌려준다. 200이 아니면 최대 `max_retries`회 재시도하고,
    /// 전송 실패는 재시도하지 않는다.
    async fn call(&mut self, path: &str, max_retries: u32) -> Result<String, CallError>;

    /// 지금까지 재시도된 비정상 응답 수
    fn error_count(&self) -> u64;
}
