// src/utils/error.rs
use std::io;
use thiserror::Error;
use url;

/// Main error type for the stats bot
///
/// Every failure the bot can hit is one of these variants. Transport
/// failures are mapped by the client that observed them, so the variant
/// always names the collaborator that failed (pool API vs chat platform).
#[derive(Error, Debug)]
pub enum BotError {
    /// The pool statistics API could not be reached, answered with an
    /// error status, or returned a document of the wrong shape
    #[error("Upstream error: {0}")]
    Upstream(String),

    /// Creating, editing or fetching a chat message failed
    #[error("Chat platform error: {0}")]
    ChatPlatform(String),

    /// The status message owned by the bot no longer exists
    #[error("Message not found: {0}")]
    MessageNotFound(String),

    /// Missing or invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Standard I/O operation errors
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// URL parsing errors
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    /// Async task execution errors
    #[error("Task execution error: {0}")]
    Task(String),
}

impl BotError {
    /// Wraps a transport error from the stats API
    pub(crate) fn upstream(context: &str, e: reqwest::Error) -> Self {
        BotError::Upstream(format!("{}: {}", context, e))
    }

    /// Wraps a transport error from the chat platform
    pub(crate) fn chat(context: &str, e: reqwest::Error) -> Self {
        BotError::ChatPlatform(format!("{}: {}", context, e))
    }
}

/// Converts async task join errors into BotError
///
/// Produced when the health server task panics or is aborted before the
/// server stops on its own.
impl From<tokio::task::JoinError> for BotError {
    fn from(e: tokio::task::JoinError) -> Self {
        BotError::Task(format!("Async task failed: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_the_failing_collaborator() {
        let err = BotError::Upstream("HTTP 502".into());
        assert_eq!(err.to_string(), "Upstream error: HTTP 502");

        let err = BotError::MessageNotFound("1234".into());
        assert_eq!(err.to_string(), "Message not found: 1234");
    }

    #[test]
    fn url_errors_convert() {
        let parse = url::Url::parse("no scheme").unwrap_err();
        let err: BotError = parse.into();
        assert!(matches!(err, BotError::Url(_)));
    }

    #[tokio::test]
    async fn join_errors_become_task_errors() {
        let task = tokio::spawn(std::future::pending::<()>());
        task.abort();
        let err: BotError = task.await.unwrap_err().into();
        assert!(err.to_string().starts_with("Task execution error: Async task failed"));
    }
}
