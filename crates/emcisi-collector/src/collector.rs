//! 클러스터 수집기.
//!
//! 세션 하나로 사이클 하나를 순차 실행한다. 단계가 실패하면 남은 단계를 건너뛰지만
//! `up`과 수집 시간 샘플은 항상 내보낸다.

use emcisi_core::models::metric::{MetricId, MetricSample};
use emcisi_core::ports::cluster_api::ClusterApi;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use crate::state::{CycleState, StepOutcome};
use crate::steps;

/// 한 사이클의 결과
#[derive(Debug, Clone)]
pub struct ScrapeReport {
    /// `clustername` 레이블 값
    pub cluster: String,
    /// 내보낼 샘플 (정보 → 단계별 → up → 수집 시간 순)
    pub samples: Vec<MetricSample>,
    /// 최종 상태. 세션 생성에 실패한 경우 `Idle`
    pub state: CycleState,
    /// 소요 시간
    pub duration: Duration,
}

impl ScrapeReport {
    /// 모든 단계가 성공했는지 여부
    pub fn is_success(&self) -> bool {
        self.state == CycleState::Done
    }

    /// 세션 생성 실패 보고서 — `up=0`과 수집 시간만 담는다
    pub fn connect_failure(cluster: &str, duration: Duration) -> Self {
        let mut report = Self {
            cluster: cluster.to_string(),
            samples: Vec::with_capacity(2),
            state: CycleState::Idle,
            duration,
        };
        report.push_summary();
        report
    }

    fn push_summary(&mut self) {
        let up = if self.is_success() { 1.0 } else { 0.0 };
        let cluster = self.cluster.as_str();
        self.samples
            .push(MetricSample::new(MetricId::ExporterUp, [cluster], up));
        self.samples.push(MetricSample::new(
            MetricId::CollectionDuration,
            [cluster],
            self.duration.as_secs_f64(),
        ));
    }
}

/// 클러스터 수집기
#[derive(Debug, Clone)]
pub struct ClusterCollector {
    call_retries: u32,
}

impl Default for ClusterCollector {
    fn default() -> Self {
        Self::new(1)
    }
}

impl ClusterCollector {
    /// 단계 호출 재시도 횟수로 수집기 생성
    pub fn new(call_retries: u32) -> Self {
        Self { call_retries }
    }

    /// 사이클 실행
    pub async fn collect(&self, api: &mut dyn ClusterApi) -> ScrapeReport {
        let start = Instant::now();

        let identity = api.identity().clone();
        let cluster = identity.name;
        let node_count = identity.node_count.to_string();

        let mut samples = vec![MetricSample::new(
            MetricId::ClusterVersion,
            [identity.version.as_str(), node_count.as_str(), cluster.as_str()],
            1.0,
        )];

        debug!("수집 시작: {} ({})", cluster, api.endpoint());

        let mut state = CycleState::Idle;
        // Idle은 결과를 보지 않는다
        let mut outcome = StepOutcome::Success(String::new());
        loop {
            state = state.next(&outcome);
            let CycleState::Calling(step) = state else {
                break;
            };

            outcome = api.call(step.path(), self.call_retries).await.into();
            match &outcome {
                StepOutcome::Success(body) => {
                    let mut buffer = steps::derive(step, &cluster, body);
                    debug!("{step}: 샘플 {}개", buffer.len());
                    samples.append(&mut buffer);
                }
                StepOutcome::Failure(e) => {
                    warn!("{cluster} 수집 단계 실패 ({step}), 남은 단계 중단: {e}");
                }
            }
        }

        let duration = start.elapsed();
        debug!(
            "수집 종료: {cluster} {:.3}s, 누적 에러 {}",
            duration.as_secs_f64(),
            api.error_count()
        );

        let mut report = ScrapeReport {
            cluster,
            samples,
            state,
            duration,
        };
        report.push_summary();

        if report.is_success() {
            info!("{} 수집 완료: 샘플 {}개", report.cluster, report.samples.len());
        }
        report
    }
}
