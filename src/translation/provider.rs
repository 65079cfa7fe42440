use futures_util::future::BoxFuture;
use serde::{Deserialize, Serialize};

use super::{ProviderError, TranslationRequest};

/// One provider call: a chunk of strings for a single language pair.
#[derive(Debug, Clone, PartialEq)]
pub struct ChunkRequest {
    pub items: Vec<TranslationRequest>,
    pub source_language: String,
    pub target_language: String,
    pub model: String,
    pub temperature: f32,
    pub app_context: Option<String>,
    pub api_key: Option<String>,
}

/// A translated string as returned by the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyedTranslation {
    pub key: String,
    pub translated_text: String,
}

impl KeyedTranslation {
    pub fn new(key: impl Into<String>, translated_text: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            translated_text: translated_text.into(),
        }
    }
}

/// A model backend able to translate a chunk of keyed strings.
///
/// Responses may omit keys or contain extra ones; the caller matches them by
/// key. Returning [`ProviderError::Unauthorized`] aborts the whole run.
pub trait TranslationProvider: Send + Sync {
    fn translate_chunk<'a>(
        &'a self,
        request: &'a ChunkRequest,
    ) -> BoxFuture<'a, Result<Vec<KeyedTranslation>, ProviderError>>;
}
