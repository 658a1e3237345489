use serde::{Deserialize, Serialize};

/// Wrapper every API response is sent in.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
    pub pagination: Option<Pagination>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub page: usize,
    pub pages: usize,
    pub total: usize,
    pub per_page: usize,
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum EnvelopeError {
    #[error("server rejected request: {0}")]
    Rejected(String),
    #[error("response reported success without data")]
    MissingData,
}

impl<T> Envelope<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            pagination: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
            pagination: None,
        }
    }

    pub fn with_pagination(mut self, pagination: Pagination) -> Self {
        self.pagination = Some(pagination);
        self
    }

    /// Unwraps the payload of a successful response.
    pub fn into_data(self) -> Result<T, EnvelopeError> {
        if !self.success {
            return Err(EnvelopeError::Rejected(
                self.error.unwrap_or_else(|| "unknown error".into()),
            ));
        }
        self.data.ok_or(EnvelopeError::MissingData)
    }

    /// Like [`Envelope::into_data`] but keeps the server pagination block.
    pub fn into_page(self) -> Result<(T, Option<Pagination>), EnvelopeError> {
        let pagination = self.pagination;
        self.into_data().map(|data| (data, pagination))
    }

    /// Write acknowledgements carry no payload; only `success` matters.
    pub fn into_ack(self) -> Result<(), EnvelopeError> {
        if self.success {
            Ok(())
        } else {
            Err(EnvelopeError::Rejected(
                self.error.unwrap_or_else(|| "unknown error".into()),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failure_envelope_carries_server_message() {
        let env: Envelope<Vec<i64>> =
            serde_json::from_str(r#"{"success": false, "error": "x"}"#).expect("parse");
        assert_eq!(env.into_data(), Err(EnvelopeError::Rejected("x".into())));
    }

    #[test]
    fn success_without_data_is_an_error() {
        let env: Envelope<Vec<i64>> = serde_json::from_str(r#"{"success": true}"#).expect("parse");
        assert_eq!(env.into_data(), Err(EnvelopeError::MissingData));
    }

    #[test]
    fn pagination_block_is_kept() {
        let env: Envelope<Vec<i64>> = serde_json::from_str(
            r#"{"success": true, "data": [1, 2],
                "pagination": {"page": 2, "pages": 4, "total": 80, "per_page": 25}}"#,
        )
        .expect("parse");
        let (data, pagination) = env.into_page().expect("page");
        assert_eq!(data, vec![1, 2]);
        assert_eq!(pagination.map(|p| p.pages), Some(4));
    }

    #[test]
    fn ack_ignores_missing_data() {
        let env: Envelope<serde_json::Value> =
            serde_json::from_str(r#"{"success": true}"#).expect("parse");
        assert!(env.into_ack().is_ok());
    }
}
