use contractiq_core::ContractId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[cfg(feature = "http")]
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("server returned {status}: {body}")]
    Server { status: u16, body: String },

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("contract {0} not found")]
    NotFound(ContractId),
}

impl ApiError {
    /// Errors worth retrying on the next poll tick.
    pub fn is_transient(&self) -> bool {
        match self {
            #[cfg(feature = "http")]
            Self::Http(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            Self::Server { status, .. } => *status >= 500 || *status == 429,
            Self::Json(_) | Self::NotFound(_) => false,
        }
    }
}
