use thiserror::Error;

#[derive(Error, Debug)]
pub enum MessagingError {
    #[error("Messaging configuration error: {0}")]
    ConfigError(String),

    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Malformed response body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("{url} responded with status {status}")]
    StatusError { url: String, status: u16 },

    #[error("User {0} has no profile picture")]
    NoPicture(String),

    #[error("Messaging provider unavailable: {0}")]
    Unavailable(String),
}
