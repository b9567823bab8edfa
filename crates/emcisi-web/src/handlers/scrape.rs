//! 스크레이프 핸들러.

use axum::extract::{Query, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use emcisi_collector::ScrapeReport;
use emcisi_core::models::cluster::ClusterEndpoint;
use emcisi_network::session::IsiSession;
use serde::Deserialize;
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::error::WebError;
use crate::exposition;
use crate::{AppState, MultiTarget, ScrapeMode};

/// `/query` 쿼리 파라미터
#[derive(Debug, Deserialize)]
pub struct QueryParams {
    /// 대상 클러스터 주소
    pub target: Option<String>,
}

fn text_response(body: String) -> Response {
    ([(header::CONTENT_TYPE, prometheus::TEXT_FORMAT)], body).into_response()
}

/// GET /metrics
///
/// 단일 대상 모드에서는 한 사이클을 실행해 클러스터 메트릭과 자체 메트릭을 함께 돌려준다.
/// 다중 대상 모드에서는 자체 메트릭만 돌려준다.
pub async fn metrics(State(state): State<AppState>) -> Result<Response, WebError> {
    let mut families = match &state.mode {
        ScrapeMode::Single(session) => {
            // 동시 스크레이프는 세션 잠금에서 직렬화된다
            let report = {
                let mut session = session.lock().await;
                state.collector.collect(&mut **session).await
            };
            state.exporter.observe(&report);
            exposition::sample_registry(&state.catalog, &report.samples)?.gather()
        }
        ScrapeMode::Multi(_) => Vec::new(),
    };

    families.extend(state.exporter.gather());
    Ok(text_response(exposition::encode(&families)?))
}

/// GET /query?target=<주소>
///
/// 대상마다 세션을 새로 만들어 한 사이클을 실행한다. 연결 실패도 200 응답
/// (`up=0`과 수집 시간)으로 돌려준다. 대상 누락과 연결 실패는 요청 에러로 센다.
pub async fn query(
    State(state): State<AppState>,
    Query(params): Query<QueryParams>,
) -> Result<Response, WebError> {
    let Some(target) = params.target.as_deref().map(str::trim).filter(|t| !t.is_empty()) else {
        state.exporter.request_error();
        return Err(WebError::BadRequest("'target' parameter must be specified".to_string()));
    };

    let ScrapeMode::Multi(multi) = &state.mode else {
        return Err(WebError::BadRequest(
            "단일 대상 모드에서는 /query를 사용할 수 없음".to_string(),
        ));
    };

    debug!("대상 스크레이프: '{target}'");
    let report = scrape_target(&state, multi, target).await;
    state.exporter.observe(&report);

    let text = exposition::render(&state.catalog, &report.samples)?;
    Ok(text_response(text))
}

async fn scrape_target(state: &AppState, multi: &MultiTarget, target: &str) -> ScrapeReport {
    let start = Instant::now();

    let endpoint = match ClusterEndpoint::from_target(target, multi.mgmt_port) {
        Ok(endpoint) => endpoint,
        Err(e) => {
            warn!("대상 주소 해석 실패: {e}");
            state.exporter.request_error();
            return ScrapeReport::connect_failure(target, start.elapsed());
        }
    };

    info!("클러스터 연결 시도: {endpoint}");
    match IsiSession::connect(multi.credentials.clone(), endpoint, &multi.http).await {
        Ok(mut session) => state.collector.collect(&mut session).await,
        Err(e) => {
            warn!("{e}");
            state.exporter.request_error();
            ScrapeReport::connect_failure(target, start.elapsed())
        }
    }
}
