//! # xcs - String Catalog Translation CLI
//!
//! `xcs` translates the strings of an app's localization catalog into many
//! target languages at once using OpenAI-compatible chat completion endpoints.
//!
//! ## Features
//!
//! - **Chunked requests**: strings are sent 20 at a time as structured JSON
//! - **Concurrent languages**: two target languages are translated in parallel
//! - **Caching**: translations are memoized in SQLite for 7 days
//! - **Partial failures**: a failed chunk only fails its own keys
//! - **Cancellation**: Ctrl+C stops the run at the next chunk boundary
//!
//! ## Quick Start
//!
//! ```bash
//! # Translate a JSON object of key -> source text
//! xcs --to fr --to de strings.json
//!
//! # From stdin, writing the results to a file
//! cat strings.json | xcs --to ja --write ja.json
//!
//! # Inspect the cache
//! xcs cache stats
//! ```
//!
//! ## Configuration
//!
//! Settings are stored in `~/.config/xcs/config.toml`:
//!
//! ```toml
//! [xcs]
//! provider = "openai"
//! from = "en"
//! to = ["fr", "de"]
//!
//! [providers.openai]
//! endpoint = "https://api.openai.com"
//! api_key_env = "OPENAI_API_KEY"
//! models = ["gpt-4o-mini", "gpt-4o"]
//! ```

/// Translation memo with TTL, size cap and pluggable persistence.
pub mod cache;

/// Command-line interface definitions and handlers.
pub mod cli;

/// Configuration file management and provider settings.
pub mod config;

/// File system utilities.
pub mod fs;

/// Input reading from files and stdin.
pub mod input;

/// Global output configuration (quiet mode, colors, stderr/stdout routing).
pub mod output;

/// XDG-style path utilities for configuration and cache.
pub mod paths;

/// Chunked, cached, multi-language translation over OpenAI-compatible APIs.
pub mod translation;

/// Terminal UI components (progress bars, colors).
pub mod ui;
