use gis_records::{EnvelopeError, ValidationError};

/// Anything that can go wrong between issuing a request and holding a typed
/// payload.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("request to {path} failed: {message}")]
    Transport { path: String, message: String },
    #[error("{path} answered HTTP {status}")]
    Status { path: String, status: u16 },
    #[error("malformed response from {path}: {source}")]
    Decode {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("{path}: {source}")]
    Envelope {
        path: String,
        #[source]
        source: EnvelopeError,
    },
    #[error(transparent)]
    Invalid(#[from] ValidationError),
}

impl ApiError {
    /// Message shown to the operator; the server's own text when it gave one.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Envelope {
                source: EnvelopeError::Rejected(message),
                ..
            } => message.clone(),
            ApiError::Invalid(err) => err.to_string(),
            ApiError::Transport { .. } => "network unavailable".into(),
            ApiError::Status { status, .. } => format!("server error ({status})"),
            ApiError::Decode { .. } | ApiError::Envelope { .. } => {
                "unexpected server response".into()
            }
        }
    }
}
