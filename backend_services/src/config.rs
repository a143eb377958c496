#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: String,
    pub max_upload_bytes: usize,
}

const DEFAULT_MAX_UPLOAD_BYTES: usize = 64 * 1024 * 1024;

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let max_upload_bytes = match lookup("MAX_UPLOAD_BYTES").map(|v| v.parse::<usize>()) {
            Some(Ok(bytes)) => bytes,
            Some(Err(e)) => {
                tracing::warn!("ignoring MAX_UPLOAD_BYTES: {}", e);
                DEFAULT_MAX_UPLOAD_BYTES
            }
            None => DEFAULT_MAX_UPLOAD_BYTES,
        };

        Self {
            bind_address: lookup("BIND_ADDRESS").unwrap_or_else(|| "127.0.0.1:3000".to_string()),
            max_upload_bytes,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}
