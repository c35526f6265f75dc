//! ui::output
//!
//! Output formatting and display.
//!
//! # Design
//!
//! Rewritten commands own stdout and stderr while they run, so hub prints
//! only before the first step and after the last one. Messages are printed
//! as given; rules already word them for the user.

use std::fmt::Display;
use std::io::{self, Write};

/// Print a message to stdout.
pub fn print(message: impl Display) {
    println!("{}", message);
}

/// Print a warning to stderr.
pub fn warn(message: impl Display) {
    eprintln!("{}", message);
}

/// Print an unexpected failure (always shown).
pub fn error(message: impl Display) {
    eprintln!("hub: {}", message);
}

/// Print emitted text: stdout when `code` is 0, stderr otherwise.
///
/// Empty text prints nothing.
pub fn emit(text: &str, code: i32) -> io::Result<()> {
    if code == 0 {
        write_text(&mut io::stdout().lock(), text)
    } else {
        write_text(&mut io::stderr().lock(), text)
    }
}

/// Write text followed by a newline unless it is empty.
pub fn write_text<W: Write>(out: &mut W, text: &str) -> io::Result<()> {
    if text.is_empty() {
        return Ok(());
    }
    writeln!(out, "{}", text.trim_end_matches('\n'))?;
    out.flush()
}
