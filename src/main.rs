use clap::Parser;
use quotepoll::cli::{run, Cli};

fn main() -> std::process::ExitCode {
    run(Cli::parse())
}
