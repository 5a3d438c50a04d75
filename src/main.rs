use anyhow::Result;
use clap::Parser;
use nummus::cli::Cli;

fn main() -> Result<()> {
    let cli = Cli::parse();
    cli.run()
}
