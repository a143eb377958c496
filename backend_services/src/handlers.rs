use axum::{
    extract::Multipart,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};

use crate::{
    services::{decode_upload, read_upload, ServiceError},
    types::ErrorResponse,
};

pub async fn health() -> &'static str {
    "ok"
}

pub async fn decode_file(multipart: Multipart) -> Response {
    let (filename, data) = match read_upload(multipart).await {
        Ok(upload) => upload,
        Err(e) => return error_response(e),
    };
    tracing::info!(%filename, bytes = data.len(), "decoding upload");

    let result = tokio::task::spawn_blocking(move || decode_upload(&data))
        .await
        .unwrap_or_else(|e| Err(ServiceError::Internal(e.to_string())));

    match result {
        Ok(decoded) => {
            tracing::info!(%filename, records = decoded.records, "decoded upload");
            Json(decoded).into_response()
        }
        Err(e) => error_response(e),
    }
}

fn error_response(err: ServiceError) -> Response {
    let (status, body) = match err {
        ServiceError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, ErrorResponse::new(msg)),
        ServiceError::Decode { error, lines } => {
            tracing::warn!(records = lines.len(), "decode failed: {}", error);
            (
                StatusCode::UNPROCESSABLE_ENTITY,
                ErrorResponse {
                    error: error.to_string(),
                    lines,
                },
            )
        }
        ServiceError::Internal(msg) => {
            tracing::error!("internal error: {}", msg);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorResponse::new("Internal server error"),
            )
        }
    };
    (status, Json(body)).into_response()
}
