use anyhow::{Context, Result};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use crate::cache::{SqliteStore, TranslationCache};
use crate::config::{ConfigManager, ResolveOptions, ResolvedConfig, resolve_config};
use crate::fs::atomic_write;
use crate::input::InputReader;
use crate::translation::{
    CancellationToken, ChunkedTranslator, MultiLanguageTranslator, TranslationBatchRequest,
    TranslationBatchResult, TranslationClient, TranslationOptions, TranslationResult,
    describe_language, validate_language,
};
use crate::ui::{LanguageProgressBars, Style};

pub struct TranslateOptions {
    pub file: Option<String>,
    pub to: Vec<String>,
    pub from: Option<String>,
    pub provider: Option<String>,
    pub model: Option<String>,
    pub context: Option<String>,
    pub no_cache: bool,
    pub write: Option<String>,
}

/// Per-language entry of the JSON written to stdout or `--write`.
#[derive(Debug, Serialize)]
struct LanguageOutput<'a> {
    results: &'a [TranslationResult],
    completed: usize,
    failed: usize,
}

/// Opens the durable cache, falling back to an in-memory one when the store
/// cannot be created.
fn open_cache(no_cache: bool) -> TranslationCache {
    if no_cache {
        return TranslationCache::in_memory();
    }

    match SqliteStore::new() {
        Ok(store) => TranslationCache::new(store),
        Err(e) => {
            log::warn!("Translation cache unavailable, continuing without persistence: {e:#}");
            TranslationCache::in_memory()
        }
    }
}

pub async fn run_translate(options: TranslateOptions) -> Result<()> {
    let config_file = ConfigManager::new().load_or_default()?;
    let config = resolve_config(
        &ResolveOptions {
            from: options.from.clone(),
            to: options.to.clone(),
            provider: options.provider.clone(),
            model: options.model.clone(),
            context: options.context.clone(),
        },
        &config_file,
    )?;

    validate_language(&config.source_language)?;
    for language in &config.target_languages {
        validate_language(language)?;
    }

    let requests = InputReader::read_requests(options.file.as_deref())?;

    let cache = Arc::new(open_cache(options.no_cache));

    let client = TranslationClient::new(config.endpoint.clone());
    let translator = ChunkedTranslator::new(Arc::new(client), Arc::clone(&cache));
    let orchestrator = MultiLanguageTranslator::new(translator);

    let token = CancellationToken::new();
    let interrupt = spawn_interrupt_handler(token.clone());

    let batches: Vec<TranslationBatchRequest> = config
        .target_languages
        .iter()
        .map(|language| TranslationBatchRequest::new(language.clone(), requests.clone()))
        .collect();

    crate::status!(
        "Translating {} string(s) from {} into {} language(s) with {} {}",
        requests.len(),
        describe_language(&config.source_language),
        batches.len(),
        Style::value(&config.provider_name),
        Style::secondary(format!("({})", config.model))
    );

    let bars = Arc::new(LanguageProgressBars::new(
        &config.target_languages,
        requests.len(),
    ));

    let outcome = orchestrator
        .translate_multiple_languages(
            &batches,
            &config.source_language,
            config.api_key.as_deref(),
            &translation_options(&config, token),
            &bars.callback(),
        )
        .await;

    interrupt.abort();
    bars.clear();
    cache.flush();

    match outcome {
        Ok(results) => {
            emit_results(&results, options.write.as_deref())?;
            print_summary(&results);
            Ok(())
        }
        Err(error) => {
            if !error.completed.is_empty() {
                emit_results(&error.completed, options.write.as_deref())?;
                print_summary(&error.completed);
            }
            if error.is_cancelled() {
                crate::status!("{}", Style::warning("Translation cancelled"));
            }
            Err(error.into())
        }
    }
}

fn translation_options(config: &ResolvedConfig, token: CancellationToken) -> TranslationOptions {
    TranslationOptions {
        model: config.model.clone(),
        max_retries: config.max_retries,
        temperature: config.temperature,
        app_context: config.app_context.clone(),
        cancellation_token: Some(token),
        ..TranslationOptions::default()
    }
}

/// Cancels `token` on the first Ctrl+C.
fn spawn_interrupt_handler(token: CancellationToken) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            log::info!("Interrupt received, cancelling translation");
            token.cancel();
        }
    })
}

fn render_results(results: &[TranslationBatchResult]) -> Result<String> {
    let output: BTreeMap<&str, LanguageOutput<'_>> = results
        .iter()
        .map(|batch| {
            (
                batch.language.as_str(),
                LanguageOutput {
                    results: &batch.results,
                    completed: batch.completed,
                    failed: batch.failed,
                },
            )
        })
        .collect();

    let mut json =
        serde_json::to_string_pretty(&output).context("Failed to serialize translations")?;
    json.push('\n');
    Ok(json)
}

fn emit_results(results: &[TranslationBatchResult], write: Option<&str>) -> Result<()> {
    let json = render_results(results)?;

    if let Some(path) = write {
        atomic_write(Path::new(path), &json)?;
        crate::status!("{} Wrote {path}", Style::success("✓"));
    } else {
        print!("{json}");
    }
    Ok(())
}

fn print_summary(results: &[TranslationBatchResult]) {
    for batch in results {
        let failed = if batch.failed == 0 {
            Style::secondary("0 failed")
        } else {
            Style::error(format!("{} failed", batch.failed))
        };
        crate::status!(
            "  {:8} {} translated, {}",
            Style::code(&batch.language),
            Style::success(batch.completed),
            failed
        );
    }
}
