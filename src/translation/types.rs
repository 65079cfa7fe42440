use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use super::{CancellationToken, TranslateError};

/// Model used when neither the caller nor the config names one.
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_MAX_RETRIES: u32 = 3;
pub const DEFAULT_TEMPERATURE: f32 = 0.3;
/// Delay before the first retry; doubled for every further attempt.
pub const DEFAULT_RETRY_BASE_DELAY: Duration = Duration::from_secs(1);

/// A string to translate, identified by its catalog key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationRequest {
    pub key: String,
    pub text: String,
}

impl TranslationRequest {
    pub fn new(key: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            text: text.into(),
        }
    }
}

/// The verdict for one request key.
///
/// A set `error` with an empty `translated_text` marks a failure of this key
/// only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslationResult {
    pub key: String,
    pub translated_text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TranslationResult {
    pub fn success(key: impl Into<String>, translated_text: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            translated_text: translated_text.into(),
            error: None,
        }
    }

    pub fn failure(key: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            translated_text: String::new(),
            error: Some(error.into()),
        }
    }

    pub const fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// All requests for one target language.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationBatchRequest {
    pub language: String,
    pub requests: Vec<TranslationRequest>,
}

impl TranslationBatchRequest {
    pub fn new(language: impl Into<String>, requests: Vec<TranslationRequest>) -> Self {
        Self {
            language: language.into(),
            requests,
        }
    }

    /// Number of requests that will get a result; empty keys are skipped.
    pub fn keyed_len(&self) -> usize {
        self.requests.iter().filter(|r| !r.key.is_empty()).count()
    }
}

/// Outcome of one target language.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationBatchResult {
    pub language: String,
    pub results: Vec<TranslationResult>,
    pub completed: usize,
    pub failed: usize,
}

impl TranslationBatchResult {
    pub fn from_results(language: impl Into<String>, results: Vec<TranslationResult>) -> Self {
        let completed = results.iter().filter(|r| r.is_success()).count();
        let failed = results.len() - completed;

        Self {
            language: language.into(),
            results,
            completed,
            failed,
        }
    }

    /// Returns the requests whose key failed, so only those can be retried.
    pub fn failed_requests(&self, requests: &[TranslationRequest]) -> Vec<TranslationRequest> {
        requests
            .iter()
            .filter(|request| {
                self.results
                    .iter()
                    .any(|result| result.key == request.key && !result.is_success())
            })
            .cloned()
            .collect()
    }
}

/// `(completed, total)` progress of a single language.
pub type ProgressCallback = Arc<dyn Fn(usize, usize) + Send + Sync>;

/// Per-language lifecycle: `Pending -> InProgress -> Completed | Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum LanguageStatus {
    Pending,
    InProgress,
    Completed,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageProgress {
    pub language: String,
    pub completed: usize,
    pub total: usize,
    pub status: LanguageStatus,
}

/// Receives [`LanguageProgress`] events.
///
/// May be called concurrently from several language futures and must not block.
pub type LanguageProgressCallback = Arc<dyn Fn(&LanguageProgress) + Send + Sync>;

/// Knobs for a translation run.
#[derive(Clone)]
pub struct TranslationOptions {
    pub model: String,
    /// Retries per chunk after the first attempt.
    pub max_retries: u32,
    pub temperature: f32,
    /// Free-form description of the app, passed to the model as guidance.
    pub app_context: Option<String>,
    pub retry_base_delay: Duration,
    pub on_progress: Option<ProgressCallback>,
    pub cancellation_token: Option<CancellationToken>,
}

impl Default for TranslationOptions {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            max_retries: DEFAULT_MAX_RETRIES,
            temperature: DEFAULT_TEMPERATURE,
            app_context: None,
            retry_base_delay: DEFAULT_RETRY_BASE_DELAY,
            on_progress: None,
            cancellation_token: None,
        }
    }
}

impl fmt::Debug for TranslationOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TranslationOptions")
            .field("model", &self.model)
            .field("max_retries", &self.max_retries)
            .field("temperature", &self.temperature)
            .field("app_context", &self.app_context)
            .field("retry_base_delay", &self.retry_base_delay)
            .field("on_progress", &self.on_progress.is_some())
            .field("cancellation_token", &self.cancellation_token)
            .finish()
    }
}

impl TranslationOptions {
    pub fn is_cancelled(&self) -> bool {
        self.cancellation_token
            .as_ref()
            .is_some_and(CancellationToken::is_cancelled)
    }

    pub(crate) fn check_cancelled(&self) -> Result<(), TranslateError> {
        if self.is_cancelled() {
            Err(TranslateError::Cancelled)
        } else {
            Ok(())
        }
    }

    pub(crate) fn report_progress(&self, completed: usize, total: usize) {
        if let Some(on_progress) = &self.on_progress {
            on_progress(completed, total);
        }
    }
}
