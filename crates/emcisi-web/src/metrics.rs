//! 익스포터 자체 메트릭.

use emcisi_collector::ScrapeReport;
use emcisi_core::models::metric::build_fq_name;
use prometheus::proto::MetricFamily;
use prometheus::{GaugeVec, IntCounter, IntCounterVec, Opts, Registry};

use crate::error::WebError;

/// 빌드 시점 정보 (`build_info` 레이블)
#[derive(Debug, Clone, Copy)]
pub struct BuildInfo {
    /// 패키지 버전
    pub version: &'static str,
    /// 커밋 식별자
    pub commit: &'static str,
    /// 빌드에 쓴 rustc 버전
    pub rustc: &'static str,
}

/// 빌드 정보, 스크레이프 횟수, 요청 에러 수
pub struct ExporterMetrics {
    registry: Registry,
    scrapes_total: IntCounterVec,
    request_errors: IntCounter,
}

impl ExporterMetrics {
    /// 자체 메트릭 레지스트리 생성
    pub fn new(namespace: &str, build: BuildInfo) -> Result<Self, WebError> {
        let registry = Registry::new();

        let build_info = GaugeVec::new(
            Opts::new(
                build_fq_name(namespace, "collector", "build_info"),
                "A metric with a constant '1' value labeled by version, commitid and rustversion exporter was built",
            ),
            &["version", "commitid", "rustversion"],
        )?;
        build_info
            .get_metric_with_label_values(&[build.version, build.commit, build.rustc])?
            .set(1.0);
        registry.register(Box::new(build_info))?;

        let scrapes_total = IntCounterVec::new(
            Opts::new(
                build_fq_name(namespace, "exporter", "scrapes_total"),
                "Total number of cluster scrapes by result.",
            ),
            &["result"],
        )?;
        // 두 결과 모두 0부터 노출
        for result in ["success", "failure"] {
            scrapes_total.get_metric_with_label_values(&[result])?;
        }
        registry.register(Box::new(scrapes_total.clone()))?;

        let request_errors = IntCounter::with_opts(Opts::new(
            build_fq_name(namespace, "", "request_errors_total"),
            "Total errors in requests to the EMC Isilon exporter",
        ))?;
        registry.register(Box::new(request_errors.clone()))?;

        Ok(Self {
            registry,
            scrapes_total,
            request_errors,
        })
    }

    /// 사이클 결과 반영
    pub fn observe(&self, report: &ScrapeReport) {
        let result = if report.is_success() { "success" } else { "failure" };
        self.scrapes_total.with_label_values(&[result]).inc();
    }

    /// 잘못된 요청이나 대상 연결 실패 기록
    pub fn request_error(&self) {
        self.request_errors.inc();
    }

    /// 현재 값 수집
    pub fn gather(&self) -> Vec<MetricFamily> {
        self.registry.gather()
    }
}
