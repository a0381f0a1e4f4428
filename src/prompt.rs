//! Line-based prompting with a universal quit answer

use std::fmt::Display;
use std::io::{self, BufRead, Write};

/// Typing this at any prompt quits (case-insensitive)
pub const QUIT: &str = "q";

/// One answer read from the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Answer {
    /// The trimmed line
    Text(String),
    /// `q`, or the input ended
    Quit,
}

impl Answer {
    /// Whether the answer is a "yes" (`y`, any case)
    pub fn is_yes(&self) -> bool {
        matches!(self, Answer::Text(text) if text.eq_ignore_ascii_case("y"))
    }
}

/// Asks questions on a writer and reads answers from a reader
pub struct Prompter<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Print one line
    pub fn say(&mut self, line: impl Display) -> io::Result<()> {
        writeln!(self.output, "{}", line)
    }

    /// Print `question` without a newline and read one answer
    pub fn ask(&mut self, question: impl Display) -> io::Result<Answer> {
        write!(self.output, "{}", question)?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(Answer::Quit);
        }

        let text = line.trim();
        if text.eq_ignore_ascii_case(QUIT) {
            Ok(Answer::Quit)
        } else {
            Ok(Answer::Text(text.to_string()))
        }
    }

    pub fn into_inner(self) -> (R, W) {
        (self.input, self.output)
    }
}
