//! Reading answers to questions from the terminal.

use std::fmt;
use std::io::{self, BufRead, Write};
use std::str::FromStr;

use log::debug;

// ---------------------------------------------------------------------------
// Line-oriented prompts over any reader / writer pair
// ---------------------------------------------------------------------------

/// Asks questions on `output` and reads one-line answers from `input`.
pub struct Prompter<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Writer used for everything that is not a prompt.
    pub fn output(&mut self) -> &mut W {
        &mut self.output
    }

    pub fn into_output(self) -> W {
        self.output
    }

    /// Print `question` and read the answer, trimmed.
    ///
    /// Returns `None` once the input is exhausted.
    pub fn ask(&mut self, question: &str) -> io::Result<Option<String>> {
        write!(self.output, "{question}")?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            debug!("end of input");
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    /// Ask until the answer parses as `T`, printing the parse error after
    /// every rejected answer.
    pub fn choose<T>(&mut self, question: &str) -> io::Result<Option<T>>
    where
        T: FromStr,
        T::Err: fmt::Display,
    {
        loop {
            let Some(answer) = self.ask(question)? else {
                return Ok(None);
            };
            match answer.parse::<T>() {
                Ok(value) => return Ok(Some(value)),
                Err(err) => {
                    debug!("rejected answer {answer:?}");
                    writeln!(self.output, "{err}")?;
                }
            }
        }
    }

    /// `true` only for a case-insensitive "yes".
    pub fn confirm(&mut self, question: &str) -> io::Result<bool> {
        Ok(matches!(self.ask(question)?, Some(a) if a.eq_ignore_ascii_case("yes")))
    }
}
