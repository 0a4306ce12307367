//! Entry point for the command-line interface.
#![forbid(unsafe_code)]

use haven_cli::CliError;

fn main() {
    match haven_cli::run() {
        Ok(()) => {}
        Err(CliError::ArgumentParsing(err)) => err.exit(),
        Err(err) => {
            eprintln!("haven: {err}");
            std::process::exit(1);
        }
    }
}
