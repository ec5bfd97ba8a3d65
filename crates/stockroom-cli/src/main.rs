#![warn(clippy::all, rust_2018_idioms)]

use clap::Parser;
use stockroom_cli::{cli::Cli, configuration::get_configuration, runtime::create_runtime};

fn main() -> anyhow::Result<()> {
    let args = Cli::parse();
    let settings = get_configuration(&args.config_dir)?;

    if let Err(e) = stockroom_cli::tracing::init(&args, &settings.log_filter) {
        eprintln!("Failed to start tracing: {e}");
    }

    let rt = create_runtime()?;
    let output = rt.block_on(stockroom_cli::run(args.command, settings))?;
    println!("{output}");
    Ok(())
}
