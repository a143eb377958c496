pub mod decoder_service;

pub use decoder_service::{decode_upload, read_upload, ServiceError};
