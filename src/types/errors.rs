use thiserror::Error;

/// Anything that keeps a backend call from producing a usable body.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FeedError {
    #[error("request failed: {0}")]
    Network(String),
    #[error("backend answered {status}: {}", .message.as_deref().unwrap_or("no details"))]
    Status { status: u16, message: Option<String> },
    #[error("unexpected response body: {0}")]
    Decode(String),
}

impl FeedError {
    /// Text worth showing a user: the server's own `error` field when it sent one.
    pub fn user_message(&self) -> String {
        match self {
            FeedError::Status {
                message: Some(message),
                ..
            } => message.clone(),
            other => other.to_string(),
        }
    }
}

impl From<reqwest::Error> for FeedError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            FeedError::Decode(err.to_string())
        } else if let Some(status) = err.status() {
            FeedError::Status {
                status: status.as_u16(),
                message: None,
            }
        } else {
            FeedError::Network(err.to_string())
        }
    }
}

impl From<url::ParseError> for FeedError {
    fn from(err: url::ParseError) -> Self {
        FeedError::Network(format!("invalid backend url: {err}"))
    }
}
