use thiserror::Error;

/// Failure of a single completion call. Never retried.
#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("request to the completion API failed: {0}")]
    Transport(String),

    #[error("completion API error ({status}): {body}")]
    Api { status: u16, body: String },

    #[error("malformed completion response: {0}")]
    MalformedResponse(String),

    #[error("completion response contained no text")]
    EmptyResponse,
}

impl From<reqwest::Error> for CompletionError {
    fn from(err: reqwest::Error) -> Self {
        CompletionError::Transport(err.to_string())
    }
}

#[derive(Debug, Error)]
pub enum AdvisorError {
    #[error("missing required configuration: {0}")]
    ConfigurationMissing(String),

    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Completion(#[from] CompletionError),
}

impl AdvisorError {
    pub fn validation(message: impl Into<String>) -> Self {
        AdvisorError::Validation(message.into())
    }
}
