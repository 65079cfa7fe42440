//! Scripted provider for translator tests.

use futures_util::future::BoxFuture;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use super::provider::{ChunkRequest, KeyedTranslation, TranslationProvider};
use super::ProviderError;

type Behavior =
    Box<dyn Fn(&ChunkRequest, usize) -> Result<Vec<KeyedTranslation>, ProviderError> + Send + Sync>;

/// Records every call and answers with a scripted behavior.
///
/// The behavior receives the request and the zero-based call index.
pub struct ScriptedProvider {
    behavior: Behavior,
    delay: Duration,
    calls: Mutex<Vec<ChunkRequest>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl ScriptedProvider {
    pub fn new(
        behavior: impl Fn(&ChunkRequest, usize) -> Result<Vec<KeyedTranslation>, ProviderError>
        + Send
        + Sync
        + 'static,
    ) -> Self {
        Self {
            behavior: Box::new(behavior),
            delay: Duration::ZERO,
            calls: Mutex::new(Vec::new()),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    /// Translates every string as `[<target>] <text>`.
    pub fn echo() -> Self {
        Self::new(|request, _| Ok(echo_translations(request)))
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn calls(&self) -> Vec<ChunkRequest> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

impl TranslationProvider for ScriptedProvider {
    fn translate_chunk<'a>(
        &'a self,
        request: &'a ChunkRequest,
    ) -> BoxFuture<'a, Result<Vec<KeyedTranslation>, ProviderError>> {
        Box::pin(async move {
            let index = {
                let mut calls = self.calls.lock().unwrap_or_else(PoisonError::into_inner);
                calls.push(request.clone());
                calls.len() - 1
            };

            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(now, Ordering::SeqCst);

            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }

            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            (self.behavior)(request, index)
        })
    }
}

pub fn echo_translations(request: &ChunkRequest) -> Vec<KeyedTranslation> {
    request
        .items
        .iter()
        .map(|item| {
            KeyedTranslation::new(&item.key, format!("[{}] {}", request.target_language, item.text))
        })
        .collect()
}
