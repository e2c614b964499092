use thiserror::Error;

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Unexpected status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Invalid payload: {0}")]
    InvalidPayload(String),
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

impl FetchError {
    /// Truncate a response body to avoid logging excessive data
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            return body.to_string();
        }
        let mut end = MAX_ERROR_BODY_LENGTH;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!(
            "{}... (truncated, {} total bytes)",
            &body[..end],
            body.len()
        )
    }

    pub fn from_status(status: u16, body: &str) -> Self {
        FetchError::Status {
            status,
            body: Self::truncate_body(body),
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        FetchError::Network(message.into())
    }

    pub fn invalid_payload(message: impl Into<String>) -> Self {
        FetchError::InvalidPayload(message.into())
    }

    /// True when the request never produced a response.
    pub fn is_network(&self) -> bool {
        matches!(self, FetchError::Network(_))
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        FetchError::Network(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_status_keeps_short_body() {
        let err = FetchError::from_status(404, "not here");
        assert_eq!(err.to_string(), "Unexpected status 404: not here");
        assert!(!err.is_network());
    }

    #[test]
    fn test_from_status_truncates_long_body() {
        let body = "x".repeat(MAX_ERROR_BODY_LENGTH + 20);
        let msg = FetchError::from_status(500, &body).to_string();
        assert!(msg.contains("truncated, 520 total bytes"));
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        // 'é' is two bytes, so byte 500 falls inside a character
        let body = format!("a{}", "é".repeat(300));
        let truncated = FetchError::truncate_body(&body);
        assert!(truncated.starts_with('a'));
        assert!(truncated.contains("total bytes"));
    }
}
