// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! `paf-decoder` command-line tool: decode dumped model outputs into skeletons.

mod cli;

use clap::Parser;

use cli::args::{Cli, Commands};
use cli::decode::{run_decode, run_topology};

fn main() {
    let cli = Cli::parse();

    match &cli.command {
        Commands::Decode(args) => run_decode(args),
        Commands::Topology(args) => run_topology(args),
    }
}
