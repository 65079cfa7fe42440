//! Subcommand implementations.

/// Cache inspection command handler.
pub mod cache;

/// Provider listing command handler.
pub mod providers;

/// Translation command handler.
pub mod translate;
