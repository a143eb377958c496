use llcpp_decoder::LogLine;

#[derive(serde::Serialize)]
pub struct DecodeResponse {
    pub records: usize,
    pub lines: Vec<LogLine>,
}

#[derive(serde::Serialize)]
pub struct ErrorResponse {
    pub error: String,
    /// Lines decoded before the failure, if any.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub lines: Vec<LogLine>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            lines: Vec::new(),
        }
    }
}
