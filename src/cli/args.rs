use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "xcs")]
#[command(about = "Translate string catalogs into many languages with OpenAI-compatible models")]
#[command(version)]
pub struct Args {
    /// JSON file mapping string keys to source text (reads from stdin if not provided)
    pub file: Option<String>,

    /// Target language code, repeatable (e.g., --to fr --to de)
    #[arg(short = 't', long = "to")]
    pub to: Vec<String>,

    /// Source language code of the strings
    #[arg(short = 'f', long)]
    pub from: Option<String>,

    /// Provider name from config.toml
    #[arg(short = 'p', long)]
    pub provider: Option<String>,

    /// Model name
    #[arg(short = 'm', long)]
    pub model: Option<String>,

    /// Short description of the app, used as terminology guidance
    #[arg(short = 'c', long)]
    pub context: Option<String>,

    /// Disable the persistent translation cache
    #[arg(short = 'n', long)]
    pub no_cache: bool,

    /// Write results to this file instead of stdout
    #[arg(short = 'w', long)]
    pub write: Option<String>,

    /// Suppress progress and status output
    #[arg(short = 'q', long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List supported language codes
    Languages,
    /// List configured providers
    Providers {
        /// Show details for a single provider
        provider: Option<String>,
    },
    /// Inspect or clear the translation cache
    Cache {
        #[command(subcommand)]
        command: CacheCommand,
    },
}

#[derive(Subcommand, Debug)]
pub enum CacheCommand {
    /// Show entry count, size and age of the cache
    Stats,
    /// Remove every cached translation
    Clear,
}
