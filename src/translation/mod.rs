mod cancel;
mod chunked;
mod client;
mod error;
mod language;
mod orchestrator;
mod prompt;
mod provider;
mod types;

#[cfg(test)]
mod testing;

pub use cancel::CancellationToken;
pub use chunked::{CHUNK_SIZE, ChunkedTranslator, EMPTY_SOURCE_ERROR, MISSING_TRANSLATION_ERROR};
pub use client::TranslationClient;
pub use error::{MultiLanguageError, ProviderError, TranslateError};
pub use language::{
    SUPPORTED_LANGUAGES, describe_language, language_name, print_languages, validate_language,
};
pub use orchestrator::{MAX_CONCURRENT_LANGUAGES, MultiLanguageTranslator};
pub use provider::{ChunkRequest, KeyedTranslation, TranslationProvider};
pub use types::{
    DEFAULT_MAX_RETRIES, DEFAULT_MODEL, DEFAULT_RETRY_BASE_DELAY, DEFAULT_TEMPERATURE,
    LanguageProgress, LanguageProgressCallback, LanguageStatus, ProgressCallback,
    TranslationBatchRequest, TranslationBatchResult, TranslationOptions, TranslationRequest,
    TranslationResult,
};
