// Authentication Error Types
// Error handling for the OAuth2 login and callback flow

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("OAuth2 code exchange failed: {0}")]
    CodeExchangeFailed(String),

    #[error("Failed to retrieve user info: {0}")]
    UserInfoFailed(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("HTTP request failed: {0}")]
    HttpError(String),

    #[error("Provider communication timeout")]
    Timeout,
}

impl From<reqwest::Error> for AuthError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            AuthError::Timeout
        } else {
            AuthError::HttpError(err.to_string())
        }
    }
}
