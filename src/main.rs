use clap::Parser;
use pricestore::cli::{run, Cli};

fn main() -> std::process::ExitCode {
    run(Cli::parse())
}
