use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("API error {code}: {text}")]
    Status { code: u16, text: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    Malformed(String),
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

impl ApiError {
    /// Truncate a response body to avoid logging excessive data
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            body.to_string()
        } else {
            format!("{}... (truncated, {} total bytes)",
                    &body[..MAX_ERROR_BODY_LENGTH],
                    body.len())
        }
    }

    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        let text = if body.trim().is_empty() {
            status
                .canonical_reason()
                .unwrap_or("unexpected status")
                .to_string()
        } else {
            Self::truncate_body(body)
        };

        ApiError::Status {
            code: status.as_u16(),
            text,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_status_uses_canonical_reason_for_empty_body() {
        let err = ApiError::from_status(reqwest::StatusCode::NOT_FOUND, "");
        assert_eq!(err.to_string(), "API error 404: Not Found");
    }

    #[test]
    fn test_from_status_truncates_long_body() {
        let body = "x".repeat(600);
        let err = ApiError::from_status(reqwest::StatusCode::BAD_GATEWAY, &body);
        let msg = err.to_string();
        assert!(msg.contains("502"));
        assert!(msg.contains("truncated"));
        assert!(msg.len() < body.len());
    }
}
