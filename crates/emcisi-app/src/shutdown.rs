//! 종료 시그널.
//!
//! 핸들러는 서버를 띄우기 전에 설치한다. 설치에 실패하면 시작하지 않는다.

use std::io;
use tracing::info;

#[cfg(unix)]
use tokio::signal::unix::{signal, Signal, SignalKind};

/// 설치된 SIGINT/SIGTERM 핸들러
pub struct ShutdownSignal {
    #[cfg(unix)]
    sigint: Signal,
    #[cfg(unix)]
    sigterm: Signal,
}

impl ShutdownSignal {
    /// 핸들러 설치
    pub fn install() -> io::Result<Self> {
        Ok(Self {
            #[cfg(unix)]
            sigint: signal(SignalKind::interrupt())?,
            #[cfg(unix)]
            sigterm: signal(SignalKind::terminate())?,
        })
    }

    /// 시그널이 올 때까지 대기. 서버의 graceful shutdown future로 넘긴다.
    #[cfg(unix)]
    pub async fn wait(mut self) {
        tokio::select! {
            _ = self.sigint.recv() => info!("SIGINT 수신, 진행 중인 스크레이프를 마치고 종료"),
            _ = self.sigterm.recv() => info!("SIGTERM 수신, 진행 중인 스크레이프를 마치고 종료"),
        }
    }

    /// 시그널이 올 때까지 대기. 서버의 graceful shutdown future로 넘긴다.
    #[cfg(not(unix))]
    pub async fn wait(self) {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("Ctrl+C 수신, 진행 중인 스크레이프를 마치고 종료"),
            Err(e) => {
                tracing::warn!("Ctrl+C 대기 실패: {e}");
                std::future::pending::<()>().await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn wait_blocks_until_signal() {
        let shutdown = ShutdownSignal::install().unwrap();
        let waited = tokio::time::timeout(Duration::from_millis(50), shutdown.wait()).await;
        assert!(waited.is_err());
    }

    #[tokio::test]
    async fn install_twice_is_allowed() {
        let first = ShutdownSignal::install();
        let second = ShutdownSignal::install();
        assert!(first.is_ok());
        assert!(second.is_ok());
    }
}
