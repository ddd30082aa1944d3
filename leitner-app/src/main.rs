mod api;
mod cli;
mod seed;
mod telemetry;

use anyhow::Result;
use clap::Parser; // needed for Cli::parse()
use tokio::runtime::Runtime;

use cli::commands::run_cli;
use cli::opts::Cli;

fn main() -> Result<()> {
    telemetry::init_tracing();
    let args = Cli::parse();

    let rt = Runtime::new()?;
    rt.block_on(run_cli(args))
}
