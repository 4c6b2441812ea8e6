//! Callscan CLI entry point.

use callscan::cli::{self, Cli, EXIT_FATAL};
use clap::Parser;

fn main() {
    let cli = Cli::parse();

    let exit_code = match cli::run(&cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {}", e);
            EXIT_FATAL
        }
    };

    std::process::exit(exit_code);
}
