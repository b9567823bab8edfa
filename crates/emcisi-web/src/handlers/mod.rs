//! HTTP 핸들러 모듈.

pub mod landing;
pub mod scrape;
