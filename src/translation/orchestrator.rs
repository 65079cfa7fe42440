use futures_util::future::join_all;
use std::sync::Arc;

use super::{
    CancellationToken, ChunkedTranslator, LanguageProgress, LanguageProgressCallback,
    LanguageStatus, MultiLanguageError, TranslateError, TranslationBatchRequest,
    TranslationBatchResult, TranslationOptions,
};

/// Number of languages translated at the same time.
///
/// Chunks within a language run sequentially, so this is also the bound on
/// concurrent provider calls.
pub const MAX_CONCURRENT_LANGUAGES: usize = 2;

/// Runs a [`ChunkedTranslator`] across several target languages.
///
/// Languages are processed in groups of `concurrency`; the languages of a
/// group run concurrently and groups run one after another.
#[derive(Clone)]
pub struct MultiLanguageTranslator {
    translator: ChunkedTranslator,
    concurrency: usize,
}

impl MultiLanguageTranslator {
    pub const fn new(translator: ChunkedTranslator) -> Self {
        Self {
            translator,
            concurrency: MAX_CONCURRENT_LANGUAGES,
        }
    }

    /// Uses a custom group size. Zero is treated as one.
    pub fn with_concurrency(translator: ChunkedTranslator, concurrency: usize) -> Self {
        Self {
            translator,
            concurrency: concurrency.max(1),
        }
    }

    pub const fn translator(&self) -> &ChunkedTranslator {
        &self.translator
    }

    /// Translates every batch and returns the results in input order.
    ///
    /// A fatal error or cancellation stops the run: the remaining languages of
    /// the current group stop at their next chunk boundary and later groups
    /// never start. The returned [`MultiLanguageError`] keeps the results of
    /// the languages that did complete.
    pub async fn translate_multiple_languages(
        &self,
        batches: &[TranslationBatchRequest],
        source_language: &str,
        api_key: Option<&str>,
        options: &TranslationOptions,
        on_language_progress: &LanguageProgressCallback,
    ) -> Result<Vec<TranslationBatchResult>, MultiLanguageError> {
        let caller_token = options.cancellation_token.clone().unwrap_or_default();
        // Cancelled on a fatal error so sibling languages stop early without
        // touching the caller's token.
        let run_token = caller_token.child_token();

        let mut completed = Vec::with_capacity(batches.len());

        for batch in batches {
            on_language_progress(&LanguageProgress {
                language: batch.language.clone(),
                completed: 0,
                total: batch.keyed_len(),
                status: LanguageStatus::Pending,
            });
        }

        for group in batches.chunks(self.concurrency) {
            if caller_token.is_cancelled() {
                log::debug!("Cancelled before starting {} languages", group.len());
                return Err(MultiLanguageError {
                    language: None,
                    source: TranslateError::Cancelled,
                    completed,
                });
            }

            let outcomes = join_all(group.iter().map(|batch| {
                self.translate_language(
                    batch,
                    source_language,
                    api_key,
                    options,
                    &run_token,
                    on_language_progress,
                )
            }))
            .await;

            let mut failure: Option<(String, TranslateError)> = None;
            for (batch, outcome) in group.iter().zip(outcomes) {
                match outcome {
                    Ok(result) => completed.push(result),
                    // The language that hit the fatal error is reported, not the
                    // siblings it cancelled.
                    Err(error) => match &failure {
                        Some((_, existing)) if !existing.is_cancelled() => {}
                        Some(_) if error.is_cancelled() => {}
                        _ => failure = Some((batch.language.clone(), error)),
                    },
                }
            }

            if let Some((language, source)) = failure {
                log::warn!("Translation to {language} failed, stopping: {source}");
                return Err(MultiLanguageError {
                    language: Some(language),
                    source,
                    completed,
                });
            }
        }

        Ok(completed)
    }

    async fn translate_language(
        &self,
        batch: &TranslationBatchRequest,
        source_language: &str,
        api_key: Option<&str>,
        options: &TranslationOptions,
        run_token: &CancellationToken,
        on_language_progress: &LanguageProgressCallback,
    ) -> Result<TranslationBatchResult, TranslateError> {
        let language = batch.language.as_str();
        let total = batch.keyed_len();

        let emit = |completed: usize, status: LanguageStatus| {
            on_language_progress(&LanguageProgress {
                language: language.to_string(),
                completed,
                total,
                status,
            });
        };

        emit(0, LanguageStatus::InProgress);

        let forward = Arc::clone(on_language_progress);
        let forward_language = batch.language.clone();
        let language_options = TranslationOptions {
            on_progress: Some(Arc::new(move |completed, _| {
                forward(&LanguageProgress {
                    language: forward_language.clone(),
                    completed,
                    total,
                    status: LanguageStatus::InProgress,
                });
            })),
            cancellation_token: Some(run_token.clone()),
            ..options.clone()
        };

        match self
            .translator
            .translate_batch(
                &batch.requests,
                source_language,
                language,
                api_key,
                &language_options,
            )
            .await
        {
            Ok(results) => {
                let result = TranslationBatchResult::from_results(language, results);
                log::debug!(
                    "Finished {language}: {} translated, {} failed",
                    result.completed,
                    result.failed
                );
                emit(result.completed + result.failed, LanguageStatus::Completed);
                Ok(result)
            }
            Err(error) => {
                if !error.is_cancelled() {
                    run_token.cancel();
                }
                emit(0, LanguageStatus::Failed);
                Err(error)
            }
        }
    }
}
