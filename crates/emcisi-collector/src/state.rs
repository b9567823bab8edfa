//! 스크레이프 사이클 상태 머신.
//!
//! ```text
//! Idle → Calling(SystemSummary) → Calling(Capacity) → Calling(DriveStats)
//!      → Calling(Alerts) → Calling(Quotas) → Done
//! ```
//!
//! 어느 `Calling` 단계에서든 호출이 실패하면 `Failed(step)`로 가고 더 이상 진행하지 않는다.

use emcisi_core::error::CallError;
use emcisi_core::ports::cluster_api::paths;
use serde::Serialize;

/// 수집 단계
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ScrapeStep {
    /// 시스템 요약 (CPU, 프로토콜별 처리량)
    SystemSummary,
    /// /ifs 용량
    Capacity,
    /// 드라이브 통계
    DriveStats,
    /// 미해결 알림
    Alerts,
    /// 쿼터
    Quotas,
}

impl ScrapeStep {
    /// 실행 순서대로 모든 단계
    pub const ALL: [ScrapeStep; 5] = [
        ScrapeStep::SystemSummary,
        ScrapeStep::Capacity,
        ScrapeStep::DriveStats,
        ScrapeStep::Alerts,
        ScrapeStep::Quotas,
    ];

    /// 이 단계가 호출하는 API 경로
    pub fn path(self) -> &'static str {
        match self {
            ScrapeStep::SystemSummary => paths::SYSTEM_SUMMARY,
            ScrapeStep::Capacity => paths::CAPACITY,
            ScrapeStep::DriveStats => paths::DRIVE_SUMMARY,
            ScrapeStep::Alerts => paths::ALERTS,
            ScrapeStep::Quotas => paths::QUOTAS,
        }
    }

    /// 로그용 이름
    pub fn name(self) -> &'static str {
        match self {
            ScrapeStep::SystemSummary => "system_summary",
            ScrapeStep::Capacity => "capacity",
            ScrapeStep::DriveStats => "drive_stats",
            ScrapeStep::Alerts => "alerts",
            ScrapeStep::Quotas => "quotas",
        }
    }

    /// 다음 단계 (마지막이면 None)
    pub fn following(self) -> Option<ScrapeStep> {
        match self {
            ScrapeStep::SystemSummary => Some(ScrapeStep::Capacity),
            ScrapeStep::Capacity => Some(ScrapeStep::DriveStats),
            ScrapeStep::DriveStats => Some(ScrapeStep::Alerts),
            ScrapeStep::Alerts => Some(ScrapeStep::Quotas),
            ScrapeStep::Quotas => None,
        }
    }
}

impl std::fmt::Display for ScrapeStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// 단계 호출 결과
#[derive(Debug, Clone, PartialEq)]
pub enum StepOutcome {
    /// 200 응답 본문
    Success(String),
    /// 호출 실패
    Failure(CallError),
}

impl From<Result<String, CallError>> for StepOutcome {
    fn from(result: Result<String, CallError>) -> Self {
        match result {
            Ok(body) => StepOutcome::Success(body),
            Err(e) => StepOutcome::Failure(e),
        }
    }
}

/// 사이클 상태
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CycleState {
    /// 시작 전
    Idle,
    /// 단계 호출 중
    Calling(ScrapeStep),
    /// 모든 단계 성공
    Done,
    /// 해당 단계에서 실패 (흡수 상태)
    Failed(ScrapeStep),
}

impl CycleState {
    /// 상태 전이
    ///
    /// `Idle`은 결과를 보지 않고 첫 단계로 간다. `Done`과 `Failed`는 그대로 유지된다.
    pub fn next(self, outcome: &StepOutcome) -> CycleState {
        match (self, outcome) {
            (CycleState::Idle, _) => CycleState::Calling(ScrapeStep::SystemSummary),
            (CycleState::Calling(step), StepOutcome::Success(_)) => step
                .following()
                .map_or(CycleState::Done, CycleState::Calling),
            (CycleState::Calling(step), StepOutcome::Failure(_)) => CycleState::Failed(step),
            (terminal, _) => terminal,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ok() -> StepOutcome {
        StepOutcome::Success("{}".to_string())
    }

    fn fail() -> StepOutcome {
        StepOutcome::Failure(CallError::Transport("refused".to_string()))
    }

    #[test]
    fn success_walks_every_step_in_order() {
        let mut state = CycleState::Idle.next(&ok());
        let mut visited = Vec::new();
        while let CycleState::Calling(step) = state {
            visited.push(step);
            state = state.next(&ok());
        }
        assert_eq!(visited, ScrapeStep::ALL);
        assert_eq!(state, CycleState::Done);
    }

    #[test]
    fn failure_is_absorbing() {
        let state = CycleState::Calling(ScrapeStep::DriveStats).next(&fail());
        assert_eq!(state, CycleState::Failed(ScrapeStep::DriveStats));
        assert_eq!(state.next(&ok()), state);
        assert_eq!(CycleState::Done.next(&fail()), CycleState::Done);
    }

    #[test]
    fn idle_ignores_outcome() {
        let first = CycleState::Calling(ScrapeStep::SystemSummary);
        assert_eq!(CycleState::Idle.next(&fail()), first);
        assert_eq!(CycleState::Idle.next(&ok()), first);
    }

    #[test]
    fn step_paths() {
        assert_eq!(ScrapeStep::Quotas.path(), "/platform/1/quota/quotas");
        assert!(ScrapeStep::Capacity.path().ends_with("&devid=all"));
        assert_eq!(ScrapeStep::Alerts.to_string(), "alerts");
    }

    #[test]
    fn outcome_from_result() {
        assert_eq!(
            StepOutcome::from(Ok("x".to_string())),
            StepOutcome::Success("x".to_string())
        );
        assert!(matches!(
            StepOutcome::from(Err(CallError::Client("tls".to_string()))),
            StepOutcome::Failure(_)
        ));
    }
}
