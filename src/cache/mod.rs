mod memo;
mod sqlite;
mod store;

pub use memo::{
    CacheConfig, CacheEntry, CacheStats, Clock, DEFAULT_MAX_ENTRIES, DEFAULT_TTL, STORAGE_KEY,
    SystemClock, TranslationCache,
};
pub use sqlite::SqliteStore;
pub use store::{CacheStore, MemoryStore};
