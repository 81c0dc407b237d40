use thiserror::Error;

/// Failure classes for admin-api calls. Background polling surfaces these on
/// the status line; user-triggered commands surface them as alerts.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("network error: {0}")]
    Network(String),
    #[error("server returned status {status}")]
    Server { status: u16 },
    #[error("malformed response: {0}")]
    Decode(String),
    #[error("invalid session: {0}")]
    Session(String),
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            return Self::Server {
                status: status.as_u16(),
            };
        }
        if err.is_decode() {
            return Self::Decode(err.to_string());
        }
        Self::Network(err.to_string())
    }
}
