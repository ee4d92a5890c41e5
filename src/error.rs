//! Error types for the question bank, the high score store and session start.

use thiserror::Error;

/// Errors raised while fetching questions from the bank.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The request never produced a response (DNS, connect, timeout, ...).
    #[error("transport error: {0}")]
    Transport(String),

    /// The server answered with a non-success HTTP status.
    #[error("HTTP error {status}")]
    Http { status: u16 },

    /// The body could not be decoded into a question batch.
    #[error("failed to decode response: {0}")]
    Decode(String),

    /// The bank reported a non-zero response code.
    #[error("question bank returned code {code}: {reason}")]
    ResponseCode { code: u8, reason: &'static str },
}

/// Why a session could not be started. Both are shown as the same failure screen.
#[derive(Debug, Error)]
pub enum SessionStartError {
    #[error("could not load questions: {0}")]
    Provider(#[from] ProviderError),

    #[error("could not load questions: the question bank returned no questions")]
    EmptyResult,
}

/// Errors raised by the persisted high score slot.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("failed to prepare store location: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_error_messages() {
        let e = ProviderError::ResponseCode {
            code: 1,
            reason: "no results",
        };
        assert_eq!(e.to_string(), "question bank returned code 1: no results");
        assert_eq!(
            ProviderError::Http { status: 503 }.to_string(),
            "HTTP error 503"
        );
    }

    #[test]
    fn test_start_error_wraps_provider_error() {
        let e: SessionStartError = ProviderError::Transport("refused".into()).into();
        assert!(e.to_string().starts_with("could not load questions"));
        assert!(SessionStartError::EmptyResult
            .to_string()
            .starts_with("could not load questions"));
    }
}
