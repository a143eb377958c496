use axum::body::Bytes;
use axum::extract::Multipart;
use llcpp_decoder::{DecodeError, LogLine, RecordDecoder};

use crate::types::DecodeResponse;

#[derive(Debug)]
pub enum ServiceError {
    InvalidInput(String),
    /// The stream is malformed; `lines` holds what decoded before the error.
    Decode {
        error: DecodeError,
        lines: Vec<LogLine>,
    },
    Internal(String),
}

/// Pull the first uploaded file out of a multipart body.
pub async fn read_upload(mut multipart: Multipart) -> Result<(String, Bytes), ServiceError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ServiceError::InvalidInput(format!("Invalid multipart data: {}", e)))?
    {
        if let Some(filename) = field.file_name() {
            let filename = filename.to_string();
            let data = field
                .bytes()
                .await
                .map_err(|e| ServiceError::InvalidInput(format!("Failed to read file data: {}", e)))?;
            return Ok((filename, data));
        }
    }

    Err(ServiceError::InvalidInput("No file found in upload".to_string()))
}

/// Decode a whole uploaded log stream.
pub fn decode_upload(data: &[u8]) -> Result<DecodeResponse, ServiceError> {
    let mut decoder = RecordDecoder::new(data);
    let mut lines = Vec::new();

    loop {
        match decoder.next_line() {
            Ok(Some(line)) => lines.push(line),
            Ok(None) => break,
            Err(error) => return Err(ServiceError::Decode { error, lines }),
        }
    }

    Ok(DecodeResponse {
        records: lines.len(),
        lines,
    })
}
