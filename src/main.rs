//! Command-line entry point for the bikeshare explorer.

use std::io;

use anyhow::{Context, Result};
use clap::Parser;

use bikeshare_explorer::app::PromptSession;
use bikeshare_explorer::config::Config;

fn main() -> Result<()> {
    let config = Config::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(config.log_level()))
        .init();

    let mut session = PromptSession::new(io::stdin().lock(), io::stdout().lock(), config);
    session.run().context("interactive session failed")
}
