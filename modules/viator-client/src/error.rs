use thiserror::Error;

pub type Result<T> = std::result::Result<T, ViatorError>;

#[derive(Debug, Error)]
pub enum ViatorError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Parse error: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for ViatorError {
    fn from(err: reqwest::Error) -> Self {
        ViatorError::Network(err.to_string())
    }
}

impl From<serde_json::Error> for ViatorError {
    fn from(err: serde_json::Error) -> Self {
        ViatorError::Parse(err.to_string())
    }
}
