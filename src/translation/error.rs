use thiserror::Error;

use super::TranslationBatchResult;

/// Failure of a single provider call.
///
/// Only [`ProviderError::Unauthorized`] is fatal; every other variant fails
/// the chunk that issued the call and nothing else.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    #[error("API key was rejected (status {status}): {body}")]
    Unauthorized { status: u16, body: String },

    #[error("API request failed with status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Failed to reach API endpoint: {0}")]
    Transport(String),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// The outgoing chunk could not be encoded; nothing was sent.
    #[error("Failed to encode request: {0}")]
    InvalidRequest(String),
}

impl ProviderError {
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized { .. })
    }
}

/// Errors that abort a translation run instead of being recorded per key.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TranslateError {
    #[error("Translation cancelled")]
    Cancelled,

    #[error("Invalid API key: {0}")]
    Unauthorized(String),
}

impl TranslateError {
    /// Cancelled work should be reverted by the caller rather than marked failed.
    pub const fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

/// A multi-language run that stopped early.
///
/// `completed` holds the results of every language that finished before the
/// failure; they stay valid and should be merged by the caller.
#[derive(Debug, Error)]
#[error("{}", stopped_message(.language.as_deref()))]
pub struct MultiLanguageError {
    /// The language whose failure stopped the run, if any.
    pub language: Option<String>,
    pub source: TranslateError,
    pub completed: Vec<TranslationBatchResult>,
}

impl MultiLanguageError {
    pub const fn is_cancelled(&self) -> bool {
        self.source.is_cancelled()
    }
}

fn stopped_message(language: Option<&str>) -> String {
    language.map_or_else(
        || "Translation stopped".to_string(),
        |language| format!("Translation into '{language}' stopped"),
    )
}
