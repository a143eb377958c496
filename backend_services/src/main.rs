mod config;
mod handlers;
mod services;
mod types;

use anyhow::Context;
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tracing_subscriber::EnvFilter;

use config::Config;
use handlers::{decode_file, health};

fn app(config: &Config) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/decode", post(decode_file))
        .layer(DefaultBodyLimit::max(config.max_upload_bytes))
        .layer(CorsLayer::permissive())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::from_env();
    let listener = TcpListener::bind(&config.bind_address)
        .await
        .with_context(|| format!("Failed to bind to {}", config.bind_address))?;

    tracing::info!("Server running on http://{}", config.bind_address);
    axum::serve(listener, app(&config))
        .await
        .context("Failed to start server")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use llcpp_decoder::{LogArg, RecordWriter};
    use tower::ServiceExt;

    const BOUNDARY: &str = "llcpp-test-boundary";

    fn upload(data: &[u8]) -> Request<Body> {
        let mut body = format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"syslog.bin\"\r\n\
             Content-Type: application/octet-stream\r\n\r\n"
        )
        .into_bytes();
        body.extend_from_slice(data);
        body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

        Request::builder()
            .method("POST")
            .uri("/api/decode")
            .header("content-type", format!("multipart/form-data; boundary={BOUNDARY}"))
            .body(Body::from(body))
            .unwrap()
    }

    async fn json_body(response: axum::response::Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let response = app(&Config::default())
            .oneshot(Request::get("/api/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_decode_upload() {
        let mut writer = RecordWriter::new(Vec::new());
        writer
            .write_record("count=%d name=%s", &[LogArg::Int(42), "abc".into()])
            .unwrap();

        let response = app(&Config::default())
            .oneshot(upload(&writer.into_inner()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_body(response).await;
        assert_eq!(body["records"], 1);
        assert_eq!(body["lines"][0], "count=42 name=abc");
    }

    #[tokio::test]
    async fn test_truncated_upload() {
        let response = app(&Config::default())
            .oneshot(upload(b"first\n\0value %lld\0\x01"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let body = json_body(response).await;
        assert!(body["error"].as_str().unwrap().contains("truncated"));
        assert_eq!(body["lines"][0], "first\n");
    }

    #[tokio::test]
    async fn test_missing_file_field() {
        let body = format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"note\"\r\n\r\nhello\r\n--{BOUNDARY}--\r\n"
        );
        let request = Request::builder()
            .method("POST")
            .uri("/api/decode")
            .header("content-type", format!("multipart/form-data; boundary={BOUNDARY}"))
            .body(Body::from(body))
            .unwrap();

        let response = app(&Config::default()).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
