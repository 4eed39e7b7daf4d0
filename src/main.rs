use clap::Parser;
use wildfire_features::cli::{run, Cli};
use wildfire_features::error::Result;

fn main() -> Result<()> {
    let cli = Cli::parse();
    run(cli)
}
