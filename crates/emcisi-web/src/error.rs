//! 웹 레이어 에러 처리.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// 웹 에러
#[derive(Debug, Error)]
pub enum WebError {
    /// 메트릭 등록/인코딩 실패
    #[error("메트릭 인코딩 실패: {0}")]
    Encoding(String),

    /// 잘못된 요청
    #[error("{0}")]
    BadRequest(String),
}

impl From<prometheus::Error> for WebError {
    fn from(err: prometheus::Error) -> Self {
        WebError::Encoding(err.to_string())
    }
}

// Prometheus 스크레이퍼가 읽을 수 있도록 평문으로 응답한다
impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        let status = match &self {
            WebError::Encoding(_) => StatusCode::INTERNAL_SERVER_ERROR,
            WebError::BadRequest(_) => StatusCode::BAD_REQUEST,
        };
        (status, self.to_string()).into_response()
    }
}
