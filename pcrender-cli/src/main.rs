//! `pcrender`: point clouds in, sphere scenes (and optionally images) out

mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Command};
use tracing_subscriber::EnvFilter;

fn init_tracing(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        1 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match &cli.command {
        Command::Render(args) => {
            let scene = commands::run_render(args)?;
            println!("{}", scene.display());
        }
        Command::Turntable(args) => {
            let scenes = commands::run_turntable(args)?;
            println!("{} frames in {}", scenes.len(), args.out_dir.display());
        }
    }

    Ok(())
}
