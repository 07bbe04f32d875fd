//! # sequencer-cli
//!
//! Drive the deterministic playback scheduler core from JSON library files.

use clap::Parser;
use log::error;

mod cli;
mod error;
mod logging;
mod runner;

fn main() {
    let args = cli::Cli::parse();
    logging::init();

    let code = match runner::run(args.command) {
        Ok(code) => code,
        Err(err) => {
            error!("{}", err.to_string().to_lowercase());
            -1
        }
    };

    std::process::exit(code)
}
