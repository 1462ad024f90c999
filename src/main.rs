/*
MIT License

Copyright (c) 2025 gvasp-rs developers
*/

//! Main executable for gvasp-rs

use clap::Parser;
use env_logger::Env;
use gvasp_rs::cli::{self, Cli};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging; RUST_LOG overrides the default level
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    log::debug!("gvasp-rs v{}", gvasp_rs::VERSION);
    cli::run(cli)
}
