//! 라우트 정의.

use axum::routing::get;
use axum::Router;

use crate::handlers;
use crate::{AppState, ScrapeMode};

/// 모드별 라우트 생성
pub fn routes(mode: &ScrapeMode) -> Router<AppState> {
    let router = Router::new()
        .route("/", get(handlers::landing::index))
        .route("/metrics", get(handlers::scrape::metrics));

    match mode {
        ScrapeMode::Single(_) => router,
        // 대상별 스크레이프
        ScrapeMode::Multi(_) => router.route("/query", get(handlers::scrape::query)),
    }
}
