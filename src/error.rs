use thiserror::Error;

/// Failure of a single outbound read.
///
/// Messages never carry request headers, so the bearer token cannot leak
/// through `Display` or `Debug`.
#[derive(Error, Debug)]
pub enum FetchError {
    /// Connection, timeout or non-2xx status.
    #[error("transport error: {0}")]
    Transport(String),

    /// The body could not be decoded in the expected format.
    #[error("decode error: {0}")]
    Decode(String),
}

impl FetchError {
    /// Name of the pipeline stage that failed, for user-facing banners.
    pub fn stage(&self) -> &'static str {
        match self {
            FetchError::Transport(_) => "fetch",
            FetchError::Decode(_) => "decode",
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            return FetchError::Decode(e.to_string());
        }

        match e.status() {
            Some(status) => FetchError::Transport(format!("upstream returned HTTP {}", status)),
            None => FetchError::Transport(e.to_string()),
        }
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(e: serde_json::Error) -> Self {
        FetchError::Decode(e.to_string())
    }
}
