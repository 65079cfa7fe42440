use std::collections::HashMap;
use std::sync::Arc;

use super::provider::{ChunkRequest, KeyedTranslation, TranslationProvider};
use super::{
    ProviderError, TranslateError, TranslationOptions, TranslationRequest, TranslationResult,
};
use crate::cache::TranslationCache;

/// Maximum number of strings sent in one provider call.
pub const CHUNK_SIZE: usize = 20;

pub const EMPTY_SOURCE_ERROR: &str = "Source text is empty";
pub const MISSING_TRANSLATION_ERROR: &str = "Translation not found in response";

/// Translates one language's requests chunk by chunk, through the cache.
#[derive(Clone)]
pub struct ChunkedTranslator {
    provider: Arc<dyn TranslationProvider>,
    cache: Arc<TranslationCache>,
}

impl ChunkedTranslator {
    pub fn new(provider: Arc<dyn TranslationProvider>, cache: Arc<TranslationCache>) -> Self {
        Self { provider, cache }
    }

    pub const fn cache(&self) -> &Arc<TranslationCache> {
        &self.cache
    }

    /// Translates `requests` from `source_language` to `target_language`.
    ///
    /// Every request with a non-empty key gets exactly one result, in input
    /// order; requests with an empty key are skipped. Chunk failures are
    /// recorded per key. Only an unauthorized API key or cancellation returns
    /// `Err`.
    pub async fn translate_batch(
        &self,
        requests: &[TranslationRequest],
        source_language: &str,
        target_language: &str,
        api_key: Option<&str>,
        options: &TranslationOptions,
    ) -> Result<Vec<TranslationResult>, TranslateError> {
        // One slot per keyed request; cached and empty texts are filled now,
        // the rest as their chunk comes back.
        let mut slots: Vec<Option<TranslationResult>> = Vec::with_capacity(requests.len());
        let mut pending: Vec<(usize, &TranslationRequest)> = Vec::new();

        for request in requests {
            if request.key.is_empty() {
                log::debug!("Skipping request without a key for {target_language}");
                continue;
            }

            let resolved = if request.text.trim().is_empty() {
                Some(TranslationResult::failure(&request.key, EMPTY_SOURCE_ERROR))
            } else {
                self.cache
                    .get(&request.text, source_language, target_language, &options.model)
                    .map(|cached| TranslationResult::success(&request.key, cached))
            };

            if resolved.is_none() {
                pending.push((slots.len(), request));
            }
            slots.push(resolved);
        }

        let total = slots.len();
        let mut completed = total - pending.len();

        if pending.is_empty() {
            log::debug!("All {total} strings for {target_language} resolved without the provider");
        } else {
            log::debug!(
                "Translating {} of {total} strings to {target_language} ({completed} cached or empty)",
                pending.len()
            );
        }

        for chunk in pending.chunks(CHUNK_SIZE) {
            options.check_cancelled()?;

            let items: Vec<&TranslationRequest> = chunk.iter().map(|(_, r)| *r).collect();
            let request = ChunkRequest {
                items: items.iter().map(|r| (*r).clone()).collect(),
                source_language: source_language.to_string(),
                target_language: target_language.to_string(),
                model: options.model.clone(),
                temperature: options.temperature,
                app_context: options.app_context.clone(),
                api_key: api_key.map(str::to_string),
            };

            let chunk_results = match self.request_with_retry(&request, options).await? {
                Ok(translations) => {
                    let chunk_results = match_translations(&items, translations);
                    self.remember(&items, &chunk_results, &request).await;
                    chunk_results
                }
                Err(error) => {
                    log::warn!(
                        "Chunk of {} strings for {target_language} failed: {error}",
                        items.len()
                    );
                    let message = format!("Translation failed: {error}");
                    items
                        .iter()
                        .map(|r| TranslationResult::failure(&r.key, message.as_str()))
                        .collect()
                }
            };

            for ((slot, _), result) in chunk.iter().zip(chunk_results) {
                slots[*slot] = Some(result);
            }

            completed += chunk.len();
            options.report_progress(completed, total);
        }

        Ok(slots.into_iter().flatten().collect())
    }

    /// Calls the provider, retrying non-fatal errors with exponential backoff.
    ///
    /// The outer `Result` aborts the run (unauthorized or cancelled); the inner
    /// one is the chunk's outcome once retries are exhausted.
    async fn request_with_retry(
        &self,
        request: &ChunkRequest,
        options: &TranslationOptions,
    ) -> Result<Result<Vec<KeyedTranslation>, ProviderError>, TranslateError> {
        let mut attempt: u32 = 0;

        loop {
            match self.provider.translate_chunk(request).await {
                Ok(translations) => return Ok(Ok(translations)),
                Err(error) if error.is_unauthorized() => {
                    return Err(TranslateError::Unauthorized(error.to_string()));
                }
                Err(error) if attempt >= options.max_retries => return Ok(Err(error)),
                Err(error) => {
                    let delay = options
                        .retry_base_delay
                        .saturating_mul(2_u32.saturating_pow(attempt));
                    attempt += 1;

                    log::warn!(
                        "Chunk for {} failed (attempt {attempt}/{}), retrying in {delay:?}: {error}",
                        request.target_language,
                        options.max_retries + 1
                    );

                    tokio::time::sleep(delay).await;
                    options.check_cancelled()?;
                }
            }
        }
    }

    /// Caches the successful results of a chunk, each under its own source
    /// text. A key sent more than once is cached only for its last request,
    /// since that is the one the provider's answer was matched to.
    async fn remember(
        &self,
        chunk: &[&TranslationRequest],
        results: &[TranslationResult],
        request: &ChunkRequest,
    ) {
        let last_index: HashMap<&str, usize> = chunk
            .iter()
            .enumerate()
            .map(|(index, req)| (req.key.as_str(), index))
            .collect();

        let pairs: Vec<(String, String)> = chunk
            .iter()
            .zip(results)
            .enumerate()
            .filter(|(index, (req, result))| {
                result.is_success() && last_index.get(req.key.as_str()) == Some(index)
            })
            .map(|(_, (req, result))| (req.text.clone(), result.translated_text.clone()))
            .collect();

        if pairs.is_empty() {
            return;
        }

        // Persisting rewrites the durable store; keep it off the async workers.
        let cache = Arc::clone(&self.cache);
        let source = request.source_language.clone();
        let target = request.target_language.clone();
        let model = request.model.clone();
        let stored = tokio::task::spawn_blocking(move || {
            let pairs: Vec<(&str, &str)> = pairs
                .iter()
                .map(|(text, translation)| (text.as_str(), translation.as_str()))
                .collect();
            cache.set_many(&source, &target, &model, &pairs);
        })
        .await;

        if let Err(e) = stored {
            log::warn!("Failed to cache translations for {}: {e}", request.target_language);
        }
    }
}

/// Maps the provider's answer back onto the chunk, one result per request.
fn match_translations(
    chunk: &[&TranslationRequest],
    translations: Vec<KeyedTranslation>,
) -> Vec<TranslationResult> {
    let by_key: HashMap<String, String> = translations
        .into_iter()
        .map(|t| (t.key, t.translated_text))
        .collect();

    let unexpected = by_key
        .keys()
        .filter(|key| !chunk.iter().any(|r| &r.key == *key))
        .count();
    if unexpected > 0 {
        log::debug!("Ignoring {unexpected} unexpected keys in provider response");
    }

    chunk
        .iter()
        .map(|request| match by_key.get(&request.key) {
            Some(text) if !text.trim().is_empty() => {
                TranslationResult::success(&request.key, text.as_str())
            }
            _ => TranslationResult::failure(&request.key, MISSING_TRANSLATION_ERROR),
        })
        .collect()
}
