//! hub - git with GitHub shorthand
//!
//! Entry point; the work happens in [`hubwork::cli::run`].

use std::process::ExitCode;

use hubwork::{cli, logging, ui::output};

fn main() -> ExitCode {
    logging::init();

    match cli::run(std::env::args().skip(1)) {
        Ok(code) => ExitCode::from(u8::try_from(code).unwrap_or(1)),
        Err(err) => {
            output::error(format!("{err:#}"));
            ExitCode::FAILURE
        }
    }
}
