//! Line-oriented command interpreter.
//!
//! Reads one command per line, runs it against a [`Session`], and writes any
//! result or error message back, one line each:
//!
//! ```text
//! > SET a 10
//! > BEGIN
//! > NUMEQUALTO 10
//! 1
//! > ROLLBACK
//! > ROLLBACK
//! NO TRANSACTION
//! > END
//! ```

mod command;
mod session;

pub use command::Command;
pub use session::{Outcome, Session, SessionConfig};

use crate::error::{Result, StoreError};
use std::io::{BufRead, Write};
use tracing::{debug, info};

/// Interpreter configuration.
#[derive(Clone, Debug)]
pub struct ReplConfig {
    /// Written before each line is read.
    pub prompt: String,

    /// Whether to write the prompt at all.
    pub show_prompt: bool,
}

impl Default for ReplConfig {
    fn default() -> Self {
        Self {
            prompt: "> ".to_string(),
            show_prompt: true,
        }
    }
}

/// Drives a [`Session`] from a reader, writing results to a writer.
pub struct Repl {
    session: Session,
    config: ReplConfig,
}

impl Repl {
    pub fn new(session: Session, config: ReplConfig) -> Self {
        Self { session, config }
    }

    /// Run until `END` or end of input.
    ///
    /// Command errors are written to `output` and the loop continues; only
    /// I/O errors end it early.
    pub fn run<R: BufRead, W: Write>(&self, mut input: R, mut output: W) -> Result<()> {
        let mut line = String::new();
        let mut count = 0u64;

        loop {
            if self.config.show_prompt {
                output.write_all(self.config.prompt.as_bytes())?;
                output.flush()?;
            }

            line.clear();
            if input.read_line(&mut line)? == 0 {
                debug!("end of input");
                break;
            }

            match self.session.execute(&line) {
                Ok(Outcome::Output(text)) => writeln!(output, "{}", text)?,
                Ok(Outcome::Silent) => {}
                Ok(Outcome::End) => break,
                Err(e @ StoreError::Io(_)) => return Err(e),
                Err(e) => writeln!(output, "{}", e)?,
            }
            count += 1;
        }

        output.flush()?;
        info!(lines = count, "session ended");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn run(script: &str) -> String {
        let repl = Repl::new(
            Session::new(),
            ReplConfig {
                show_prompt: false,
                ..Default::default()
            },
        );
        let mut out = Vec::new();
        repl.run(Cursor::new(script), &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_run_outputs() {
        let out = run("SET a 10\nGET a\nGET b\nNUMEQUALTO 10\n");
        assert_eq!(out, "10\nNULL\n1\n");
    }

    #[test]
    fn test_run_stops_at_end() {
        let out = run("SET a 10\nEND\nGET a\n");
        assert_eq!(out, "");
    }

    #[test]
    fn test_run_reports_errors_and_continues() {
        let out = run("ROLLBACK\nFOO\nSET a 1\nGET a\n");
        assert_eq!(out, "NO TRANSACTION\nUnable to find FOO command.\n1\n");
    }

    #[test]
    fn test_prompt_written() {
        let repl = Repl::new(Session::new(), ReplConfig::default());
        let mut out = Vec::new();
        repl.run(Cursor::new("GET a\n"), &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "> NULL\n> ");
    }
}
