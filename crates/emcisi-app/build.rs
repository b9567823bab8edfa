//! 빌드 스크립트 — `build_info`의 rustc 버전 레이블 주입
//!
//! `EMCISI_RUSTC_VERSION`이 이미 있으면 그 값을 쓴다.

use std::process::Command;

fn main() {
    println!("cargo:rerun-if-env-changed=EMCISI_RUSTC_VERSION");

    if std::env::var_os("EMCISI_RUSTC_VERSION").is_some() {
        return;
    }

    // `rustc 1.85.0 (4d91de4e4 2025-02-17)` → `1.85.0`
    let rustc = std::env::var("RUSTC").unwrap_or_else(|_| "rustc".to_string());
    let version = Command::new(rustc)
        .arg("--version")
        .output()
        .ok()
        .and_then(|out| String::from_utf8(out.stdout).ok())
        .and_then(|text| text.split_whitespace().nth(1).map(str::to_string))
        .unwrap_or_else(|| "unknown".to_string());

    println!("cargo:rustc-env=EMCISI_RUSTC_VERSION={version}");
}
