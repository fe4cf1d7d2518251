//! melframe binary entry point.

mod cli;
mod run;

use clap::Parser;
use mf_core::EngineConfig;

use crate::cli::{Cli, Command};

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let base = match &cli.config {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default(),
    };
    let config = cli.engine.apply(base);
    config.validate()?;
    log::debug!("engine config: {config:?}");

    match cli.command {
        Command::Extract { input } => run::extract(config, &input),
        Command::Encode { wav, hop } => run::encode(config, &wav, hop),
        Command::Wav { wav, hop } => run::wav(config, &wav, hop),
    }
}
