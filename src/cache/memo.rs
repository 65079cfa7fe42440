use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use super::{CacheStore, MemoryStore};

/// Entries older than this are treated as absent.
pub const DEFAULT_TTL: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// Upper bound on the number of cached translations.
pub const DEFAULT_MAX_ENTRIES: usize = 10_000;

/// Key under which the whole cache is persisted in its [`CacheStore`].
pub const STORAGE_KEY: &str = "translation-cache";

type Entries = HashMap<String, CacheEntry>;

/// Source of the current time in milliseconds since the Unix epoch.
pub trait Clock: Send + Sync {
    fn now_ms(&self) -> i64;
}

/// Wall-clock [`Clock`].
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |elapsed| elapsed.as_millis() as i64)
    }
}

/// Expiry and size policy of a [`TranslationCache`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheConfig {
    pub ttl: Duration,
    pub max_entries: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: DEFAULT_TTL,
            max_entries: DEFAULT_MAX_ENTRIES,
        }
    }
}

/// A single memoized translation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheEntry {
    pub translated_text: String,
    /// Insertion time in milliseconds since the Unix epoch.
    pub timestamp: i64,
    pub source_language: String,
    pub target_language: String,
    pub model: String,
}

/// Snapshot of cache occupancy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub total_entries: usize,
    /// Size of the serialized cache in bytes.
    pub approximate_size_bytes: usize,
    pub oldest_entry_timestamp: Option<i64>,
}

/// Content-addressed memo of `(text, source, target, model) -> translation`.
///
/// Entries expire after the configured TTL and the oldest entries are evicted
/// once the size cap is exceeded. The map is loaded lazily from the store on
/// first access and written back after every mutation. Store failures are
/// logged and otherwise ignored, so a broken store only costs persistence.
///
/// All methods take `&self` and are safe to call from concurrent tasks.
pub struct TranslationCache {
    store: Box<dyn CacheStore>,
    clock: Box<dyn Clock>,
    config: CacheConfig,
    entries: Mutex<Option<Entries>>,
}

impl TranslationCache {
    pub fn new(store: impl CacheStore + 'static) -> Self {
        Self::with_config(store, CacheConfig::default())
    }

    pub fn with_config(store: impl CacheStore + 'static, config: CacheConfig) -> Self {
        Self::with_clock(store, config, SystemClock)
    }

    pub fn with_clock(
        store: impl CacheStore + 'static,
        config: CacheConfig,
        clock: impl Clock + 'static,
    ) -> Self {
        Self {
            store: Box::new(store),
            clock: Box::new(clock),
            config,
            entries: Mutex::new(None),
        }
    }

    /// A cache that never outlives the process.
    pub fn in_memory() -> Self {
        Self::new(MemoryStore::new())
    }

    pub const fn config(&self) -> CacheConfig {
        self.config
    }

    /// Computes the memoization key for a translation.
    ///
    /// The key is a SHA-256 digest of the ordered tuple, so it is sensitive to
    /// argument order and case. It identifies cache entries only and carries
    /// no security meaning.
    pub fn cache_key(
        text: &str,
        source_language: &str,
        target_language: &str,
        model: &str,
    ) -> String {
        let cache_input = serde_json::json!([text, source_language, target_language, model]);

        let mut hasher = Sha256::new();
        hasher.update(cache_input.to_string().as_bytes());
        hex::encode(hasher.finalize())
    }

    /// Returns the cached translation, purging it instead if it has expired.
    pub fn get(
        &self,
        text: &str,
        source_language: &str,
        target_language: &str,
        model: &str,
    ) -> Option<String> {
        let key = Self::cache_key(text, source_language, target_language, model);
        let now = self.clock.now_ms();

        let mut guard = self.lock();
        let entries = self.loaded(&mut guard);

        let fresh = self.is_fresh(entries.get(&key)?, now);
        if fresh {
            return entries.get(&key).map(|entry| entry.translated_text.clone());
        }

        log::debug!("Cache entry {key} expired, purging");
        entries.remove(&key);
        self.persist(entries);
        None
    }

    /// Stores a translation, evicting the oldest entries if the cap is exceeded.
    pub fn set(
        &self,
        text: &str,
        source_language: &str,
        target_language: &str,
        model: &str,
        translated_text: &str,
    ) {
        self.set_many(
            source_language,
            target_language,
            model,
            &[(text, translated_text)],
        );
    }

    /// Stores several `(text, translation)` pairs for one language pair and
    /// persists once.
    pub fn set_many(
        &self,
        source_language: &str,
        target_language: &str,
        model: &str,
        pairs: &[(&str, &str)],
    ) {
        if pairs.is_empty() {
            return;
        }

        let now = self.clock.now_ms();

        let mut guard = self.lock();
        let entries = self.loaded(&mut guard);

        for (text, translated_text) in pairs {
            entries.insert(
                Self::cache_key(text, source_language, target_language, model),
                CacheEntry {
                    translated_text: (*translated_text).to_string(),
                    timestamp: now,
                    source_language: source_language.to_string(),
                    target_language: target_language.to_string(),
                    model: model.to_string(),
                },
            );
        }

        self.evict_overflow(entries);
        self.persist(entries);
    }

    /// Drops every entry and the persisted copy.
    pub fn clear(&self) {
        let mut guard = self.lock();
        *guard = Some(HashMap::new());

        if let Err(e) = self.store.remove(STORAGE_KEY) {
            log::warn!("Failed to remove persisted translation cache: {e:#}");
        }
    }

    pub fn stats(&self) -> CacheStats {
        let mut guard = self.lock();
        let entries = self.loaded(&mut guard);

        CacheStats {
            total_entries: entries.len(),
            approximate_size_bytes: serde_json::to_vec(&*entries).map_or(0, |bytes| bytes.len()),
            oldest_entry_timestamp: entries.values().map(|entry| entry.timestamp).min(),
        }
    }

    /// Writes the current entries to the store, if they were ever loaded.
    pub fn flush(&self) {
        let guard = self.lock();
        if let Some(entries) = guard.as_ref() {
            self.persist(entries);
        }
    }

    fn lock(&self) -> MutexGuard<'_, Option<Entries>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn loaded<'a>(&self, slot: &'a mut Option<Entries>) -> &'a mut Entries {
        slot.get_or_insert_with(|| self.load())
    }

    fn load(&self) -> Entries {
        let bytes = match self.store.get(STORAGE_KEY) {
            Ok(Some(bytes)) => bytes,
            Ok(None) => return HashMap::new(),
            Err(e) => {
                log::warn!("Translation cache store unavailable, starting empty: {e:#}");
                return HashMap::new();
            }
        };

        let mut entries: Entries = match serde_json::from_slice(&bytes) {
            Ok(entries) => entries,
            Err(e) => {
                log::warn!("Persisted translation cache is corrupted, starting empty: {e}");
                return HashMap::new();
            }
        };

        let now = self.clock.now_ms();
        entries.retain(|_, entry| self.is_fresh(entry, now));
        self.evict_overflow(&mut entries);

        log::debug!("Loaded {} cached translations", entries.len());
        entries
    }

    fn persist(&self, entries: &Entries) {
        let bytes = match serde_json::to_vec(entries) {
            Ok(bytes) => bytes,
            Err(e) => {
                log::warn!("Failed to serialize translation cache: {e}");
                return;
            }
        };

        if let Err(e) = self.store.put(STORAGE_KEY, &bytes) {
            log::warn!("Failed to persist translation cache: {e:#}");
        }
    }

    fn is_fresh(&self, entry: &CacheEntry, now: i64) -> bool {
        let ttl_ms = i64::try_from(self.config.ttl.as_millis()).unwrap_or(i64::MAX);
        now.saturating_sub(entry.timestamp) <= ttl_ms
    }

    fn evict_overflow(&self, entries: &mut Entries) {
        if entries.len() <= self.config.max_entries {
            return;
        }

        let excess = entries.len() - self.config.max_entries;

        // Ties on timestamp are broken by key so eviction is deterministic.
        let mut by_age: Vec<(i64, String)> = entries
            .iter()
            .map(|(key, entry)| (entry.timestamp, key.clone()))
            .collect();
        by_age.sort_unstable();

        for (_, key) in by_age.into_iter().take(excess) {
            entries.remove(&key);
        }

        log::debug!("Evicted {excess} cached translations over the size cap");
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use anyhow::bail;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicI64, Ordering};

    #[derive(Clone, Default)]
    struct ManualClock(Arc<AtomicI64>);

    impl ManualClock {
        fn set(&self, now: i64) {
            self.0.store(now, Ordering::SeqCst);
        }
    }

    impl Clock for ManualClock {
        fn now_ms(&self) -> i64 {
            self.0.load(Ordering::SeqCst)
        }
    }

    struct FailingStore;

    impl CacheStore for FailingStore {
        fn get(&self, _key: &str) -> anyhow::Result<Option<Vec<u8>>> {
            bail!("storage unavailable")
        }

        fn put(&self, _key: &str, _value: &[u8]) -> anyhow::Result<()> {
            bail!("storage unavailable")
        }

        fn remove(&self, _key: &str) -> anyhow::Result<()> {
            bail!("storage unavailable")
        }
    }

    fn ttl_ms() -> i64 {
        DEFAULT_TTL.as_millis() as i64
    }

    fn create_test_cache(clock: &ManualClock) -> TranslationCache {
        TranslationCache::with_clock(MemoryStore::new(), CacheConfig::default(), clock.clone())
    }

    #[test]
    fn test_cache_miss_is_idempotent() {
        let cache = TranslationCache::in_memory();

        assert!(cache.get("Hello", "en", "fr", "gpt-4o-mini").is_none());
        assert!(cache.get("Hello", "en", "fr", "gpt-4o-mini").is_none());
    }

    #[test]
    fn test_cache_hit_after_set() {
        let cache = TranslationCache::in_memory();

        cache.set("Hello", "en", "fr", "gpt-4o-mini", "Bonjour");

        assert_eq!(
            cache.get("Hello", "en", "fr", "gpt-4o-mini"),
            Some("Bonjour".to_string())
        );
    }

    #[test]
    fn test_different_language_pairs_different_entries() {
        let cache = TranslationCache::in_memory();

        cache.set("Hello", "en", "fr", "gpt-4o-mini", "Bonjour");
        cache.set("Hello", "en", "de", "gpt-4o-mini", "Hallo");

        assert_eq!(
            cache.get("Hello", "en", "fr", "gpt-4o-mini"),
            Some("Bonjour".to_string())
        );
        assert_eq!(
            cache.get("Hello", "en", "de", "gpt-4o-mini"),
            Some("Hallo".to_string())
        );
        assert!(cache.get("Hello", "en", "de", "gpt-4o").is_none());
    }

    #[test]
    fn test_cache_key_is_order_and_case_sensitive() {
        let key = TranslationCache::cache_key("Hello", "en", "fr", "m");

        assert_eq!(key, TranslationCache::cache_key("Hello", "en", "fr", "m"));
        assert_ne!(key, TranslationCache::cache_key("hello", "en", "fr", "m"));
        assert_ne!(key, TranslationCache::cache_key("Hello", "fr", "en", "m"));
        assert_ne!(
            TranslationCache::cache_key("a|b", "c", "fr", "m"),
            TranslationCache::cache_key("a", "b|c", "fr", "m")
        );
    }

    #[test]
    fn test_entry_at_ttl_boundary_is_fresh() {
        let clock = ManualClock::default();
        let cache = create_test_cache(&clock);

        clock.set(1_000);
        cache.set("Hello", "en", "fr", "m", "Bonjour");
        clock.set(1_000 + ttl_ms());

        assert_eq!(cache.get("Hello", "en", "fr", "m"), Some("Bonjour".to_string()));
    }

    #[test]
    fn test_expired_entry_is_absent_and_purged() {
        let clock = ManualClock::default();
        let cache = create_test_cache(&clock);

        clock.set(1_000);
        cache.set("Hello", "en", "fr", "m", "Bonjour");
        assert_eq!(cache.stats().total_entries, 1);

        clock.set(1_000 + ttl_ms() + 1);

        assert!(cache.get("Hello", "en", "fr", "m").is_none());
        assert_eq!(cache.stats().total_entries, 0);
    }

    #[test]
    fn test_size_cap_evicts_oldest() {
        let clock = ManualClock::default();
        let config = CacheConfig {
            ttl: DEFAULT_TTL,
            max_entries: 3,
        };
        let cache = TranslationCache::with_clock(MemoryStore::new(), config, clock.clone());

        for (i, text) in ["one", "two", "three", "four"].iter().enumerate() {
            clock.set(100 + i as i64);
            cache.set(text, "en", "fr", "m", &text.to_uppercase());
        }

        assert_eq!(cache.stats().total_entries, 3);
        assert!(cache.get("one", "en", "fr", "m").is_none());
        assert_eq!(cache.get("four", "en", "fr", "m"), Some("FOUR".to_string()));
    }

    #[test]
    fn test_default_cap_holds_at_max_entries() {
        let clock = ManualClock::default();
        let cache = create_test_cache(&clock);

        let texts: Vec<String> = (0..DEFAULT_MAX_ENTRIES).map(|i| format!("text {i}")).collect();
        let pairs: Vec<(&str, &str)> = texts.iter().map(|t| (t.as_str(), "x")).collect();

        clock.set(1);
        cache.set_many("en", "fr", "m", &pairs);
        assert_eq!(cache.stats().total_entries, DEFAULT_MAX_ENTRIES);

        clock.set(2);
        cache.set("newest", "en", "fr", "m", "y");

        let stats = cache.stats();
        assert_eq!(stats.total_entries, DEFAULT_MAX_ENTRIES);
        assert_eq!(stats.oldest_entry_timestamp, Some(1));
        assert_eq!(cache.get("newest", "en", "fr", "m"), Some("y".to_string()));
    }

    #[test]
    fn test_entries_persist_across_instances() {
        let store = Arc::new(MemoryStore::new());

        let first = TranslationCache::new(Arc::clone(&store));
        first.set("Hello", "en", "ja", "m", "こんにちは");

        let second = TranslationCache::new(store);
        assert_eq!(
            second.get("Hello", "en", "ja", "m"),
            Some("こんにちは".to_string())
        );
    }

    #[test]
    fn test_expired_entries_dropped_on_load() {
        let store = Arc::new(MemoryStore::new());
        let clock = ManualClock::default();

        clock.set(0);
        TranslationCache::with_clock(Arc::clone(&store), CacheConfig::default(), clock.clone())
            .set("Hello", "en", "fr", "m", "Bonjour");

        clock.set(ttl_ms() + 1);
        let reloaded = TranslationCache::with_clock(store, CacheConfig::default(), clock);
        assert_eq!(reloaded.stats().total_entries, 0);
    }

    #[test]
    fn test_corrupted_store_degrades_to_empty() {
        let store = Arc::new(MemoryStore::new());
        store.put(STORAGE_KEY, b"{not json").unwrap();

        let cache = TranslationCache::new(Arc::clone(&store));
        assert!(cache.get("Hello", "en", "fr", "m").is_none());

        cache.set("Hello", "en", "fr", "m", "Bonjour");
        assert_eq!(cache.get("Hello", "en", "fr", "m"), Some("Bonjour".to_string()));
    }

    #[test]
    fn test_failing_store_keeps_working_in_memory() {
        let cache = TranslationCache::new(FailingStore);

        assert!(cache.get("Hello", "en", "fr", "m").is_none());
        cache.set("Hello", "en", "fr", "m", "Bonjour");
        assert_eq!(cache.get("Hello", "en", "fr", "m"), Some("Bonjour".to_string()));

        cache.clear();
        assert_eq!(cache.stats().total_entries, 0);
    }

    #[test]
    fn test_clear_removes_persisted_copy() {
        let store = Arc::new(MemoryStore::new());
        let cache = TranslationCache::new(Arc::clone(&store));

        cache.set("Hello", "en", "fr", "m", "Bonjour");
        assert!(store.get(STORAGE_KEY).unwrap().is_some());

        cache.clear();

        assert!(store.get(STORAGE_KEY).unwrap().is_none());
        assert!(cache.get("Hello", "en", "fr", "m").is_none());
    }

    #[test]
    fn test_stats() {
        let clock = ManualClock::default();
        let cache = create_test_cache(&clock);

        let empty = cache.stats();
        assert_eq!(empty.total_entries, 0);
        assert_eq!(empty.oldest_entry_timestamp, None);

        clock.set(10);
        cache.set("Hello", "en", "fr", "m", "Bonjour");
        clock.set(20);
        cache.set("Bye", "en", "fr", "m", "Au revoir");

        let stats = cache.stats();
        assert_eq!(stats.total_entries, 2);
        assert_eq!(stats.oldest_entry_timestamp, Some(10));
        assert!(stats.approximate_size_bytes > 0);
    }
}
