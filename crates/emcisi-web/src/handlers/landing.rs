//! 랜딩 페이지.

use axum::extract::State;
use axum::response::Html;

use crate::{AppState, ScrapeMode};

const SINGLE_PAGE: &str = r#"<html>
<head><title>Dell EMC Isilon Exporter</title></head>
<body>
<h1>Dell EMC Isilon Exporter</h1>
<p><a href="/metrics">Metrics</a></p>
</body>
</html>"#;

const MULTI_PAGE: &str = r#"<html>
<head>
<title>Isilon Cluster Exporter</title>
<style>
label { display: inline-block; width: 75px; }
form label, form input { margin: 10px; }
</style>
</head>
<body>
<h1>Isilon Cluster Exporter</h1>
<form action="/query">
<label>Target:</label> <input type="text" name="target" placeholder="X.X.X.X" value="1.2.3.4"><br>
<input type="submit" value="Submit">
</form>
<p><a href="/metrics">Exporter metrics</a></p>
</body>
</html>"#;

/// GET /
pub async fn index(State(state): State<AppState>) -> Html<&'static str> {
    match state.mode {
        ScrapeMode::Single(_) => Html(SINGLE_PAGE),
        ScrapeMode::Multi(_) => Html(MULTI_PAGE),
    }
}
