//! emcisi 핵심 에러 타입.
//!
//! 원격 호출 실패는 [`CallError`], 세션 생성 실패는 [`ConnectError`]로 구분한다.
//! 필드 추출 실패는 에러가 아니다 (`extract::Field::Missing` → 0/빈 문자열).
//! 설정과 대상 주소 오류는 [`CoreError`]로 바이너리까지 전파된다.

use thiserror::Error;

/// 단일 API 호출 실패.
///
/// 해당 스크레이프 사이클의 나머지 단계만 중단시킨다.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CallError {
    /// 전송 계층 실패 (DNS, 연결 거부, 타임아웃, 본문 읽기 실패). 재시도하지 않는다.
    #[error("전송 실패: {0}")]
    Transport(String),

    /// 200이 아닌 응답이 재시도 후에도 계속됨
    #[error("HTTP {status} 응답 ({path}), {attempts}회 시도 후 포기")]
    Status {
        /// 요청 경로
        path: String,
        /// 마지막 응답 상태 코드
        status: u16,
        /// 총 시도 횟수 (최초 요청 포함)
        attempts: u32,
    },

    /// HTTP 클라이언트 구성 실패
    #[error("HTTP 클라이언트 생성 실패: {0}")]
    Client(String),
}

impl CallError {
    /// 전송 계층 실패 여부
    pub fn is_transport(&self) -> bool {
        matches!(self, CallError::Transport(_))
    }
}

/// 세션 생성(신원 확인 호출) 실패.
///
/// 이 세션으로는 더 이상 호출하지 않는다.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("클러스터 연결 실패 ({address}): {source}")]
pub struct ConnectError {
    /// 대상 클러스터 주소
    pub address: String,
    /// 신원 확인 호출의 실패 원인
    #[source]
    pub source: CallError,
}

/// 코어 레이어 에러.
#[derive(Debug, Error)]
pub enum CoreError {
    /// 설정값 오류
    #[error("설정 에러: {0}")]
    Config(String),

    /// 세션 생성 실패
    #[error(transparent)]
    Connect(#[from] ConnectError),

    /// API 호출 실패
    #[error(transparent)]
    Call(#[from] CallError),
}

impl From<config::ConfigError> for CoreError {
    fn from(err: config::ConfigError) -> Self {
        CoreError::Config(err.to_string())
    }
}
