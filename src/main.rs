use clap::Parser;
use fundmirror::cli::{Cli, run};

fn main() -> std::process::ExitCode {
    run(Cli::parse())
}
