mod manager;

pub use manager::{
    ConfigFile, ConfigManager, DEFAULT_SOURCE_LANGUAGE, ProviderConfig, ResolveOptions,
    ResolvedConfig, XcsConfig, resolve_config,
};
