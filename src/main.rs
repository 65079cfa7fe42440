use clap::Parser;
use std::process::ExitCode;

use xcs_cli::cli::commands::{cache, providers, translate};
use xcs_cli::cli::{Args, Command};
use xcs_cli::output::{self, OutputConfig};
use xcs_cli::translation::{MultiLanguageError, TranslateError, print_languages};
use xcs_cli::ui::Style;

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = Args::parse();

    output::init(OutputConfig {
        quiet: args.quiet,
        no_color: args.no_color || OutputConfig::default().no_color,
    });

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {e:#}", Style::error("Error:"));
            ExitCode::from(exit_code_for(&e) as u8)
        }
    }
}

async fn run(args: Args) -> anyhow::Result<()> {
    match args.command {
        Some(Command::Languages) => print_languages(),
        Some(Command::Providers { provider }) => providers::print_providers(provider.as_deref())?,
        Some(Command::Cache { command }) => cache::run_cache(&command)?,
        None => {
            let options = translate::TranslateOptions {
                file: args.file,
                to: args.to,
                from: args.from,
                provider: args.provider,
                model: args.model,
                context: args.context,
                no_cache: args.no_cache,
                write: args.write,
            };
            translate::run_translate(options).await?;
        }
    }

    Ok(())
}

fn exit_code_for(error: &anyhow::Error) -> exitcode::ExitCode {
    match error.downcast_ref::<MultiLanguageError>() {
        Some(e) => match e.source {
            TranslateError::Unauthorized(_) => exitcode::NOPERM,
            TranslateError::Cancelled => exitcode::TEMPFAIL,
        },
        None if error.downcast_ref::<serde_json::Error>().is_some() => exitcode::DATAERR,
        None => exitcode::SOFTWARE,
    }
}
