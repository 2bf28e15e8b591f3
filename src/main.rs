use clap::Parser;

use cppscanner::cli::{self, Cli};

fn main() {
    let cli = Cli::parse();
    if let Err(err) = cli::run(cli) {
        tracing::error!("{err}");
        std::process::exit(1);
    }
}
