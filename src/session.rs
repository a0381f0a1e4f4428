//! Interactive update session
//!
//! Fills in whatever the command line left out by prompting, then runs the
//! file update. Every prompt accepts `q` to quit. In [`Mode::Force`] and
//! [`Mode::Chase`] the configured defaults are used and nothing is confirmed.

use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::{default_output_path, Config};
use crate::document::EditSummary;
use crate::error::Result;
use crate::field::{canonical_name, is_valid_name, is_valid_value, Field};
use crate::prompt::{Answer, Prompter};
use crate::updater::{same_file, update_file};

const SAME_FILE_ERROR: &str = "\nERROR!: INPUT FILE CAN NOT EQUAL OUTPUT FILE NAME\n";

/// How much of the run comes from configured defaults
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Mode {
    /// Prompt for anything missing and confirm before writing
    #[default]
    Interactive,
    /// Use the default output, value and field name; no confirmation
    Force,
    /// Like `Force`, then set the grid-square field in a second output file
    Chase,
}

impl Mode {
    pub fn is_forced(self) -> bool {
        self != Mode::Interactive
    }
}

/// What the command line supplied
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Request {
    pub input: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub value: Option<String>,
    pub field_name: Option<String>,
    pub mode: Mode,
}

/// States of the field value prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueState {
    AwaitingValue,
    Validating(String),
    Confirmed(String),
    Aborted,
}

/// Results of the extra grid-square pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChaseReport {
    pub output: PathBuf,
    pub field_name: String,
    pub summary: EditSummary,
}

/// What a completed run did
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub input: PathBuf,
    pub output: PathBuf,
    pub field_name: String,
    pub value: String,
    pub summary: EditSummary,
    pub chase: Option<ChaseReport>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Completed(Report),
    /// The user declined the confirmation
    Cancelled,
    /// The user quit at a prompt
    Quit,
}

pub struct Session<'a, R, W> {
    config: &'a Config,
    prompter: Prompter<R, W>,
    program: String,
}

impl<'a, R: BufRead, W: Write> Session<'a, R, W> {
    pub fn new(config: &'a Config, prompter: Prompter<R, W>) -> Self {
        Self {
            config,
            prompter,
            program: String::from("adif-edit"),
        }
    }

    /// Program name shown in the usage line
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    pub fn into_prompter(self) -> Prompter<R, W> {
        self.prompter
    }

    /// Resolve everything the request is missing, then update the file
    pub fn run(&mut self, request: Request) -> Result<Outcome> {
        let config = self.config;
        let forced = request.mode.is_forced();

        let (output, value, field_name) = if forced {
            self.prompter.say("=== ADIF Field Updater ===\n")?;
            let defaults = &config.defaults;
            (
                Some(defaults.output_path.clone()),
                Some(defaults.value.clone()),
                Some(defaults.field_name.clone()),
            )
        } else {
            (request.output, request.value, request.field_name)
        };

        let Some(input) = self.resolve_input(request.input, output.as_deref())? else {
            return self.quit();
        };
        let Some(output) = self.resolve_output(output, &input)? else {
            return self.quit();
        };
        let Some(value) = self.resolve_value(value, forced)? else {
            return self.quit();
        };
        let Some(field_name) = self.resolve_field_name(field_name)? else {
            return self.quit();
        };

        let field = Field::new(&field_name, value.as_str());
        self.prompter.say(format!("\nWill add/update {} to all records", field))?;
        self.prompter.say(format!("(Existing {} fields will be updated with the new value)", field_name))?;
        self.prompter.say(format!("Input:  {}", input.display()))?;
        self.prompter.say(format!("Output: {}", output.display()))?;

        if !forced {
            match self.prompter.ask("\nProceed? (y/n): ")? {
                Answer::Quit => return self.quit(),
                answer if answer.is_yes() => {}
                _ => {
                    self.prompter.say("Operation cancelled")?;
                    return Ok(Outcome::Cancelled);
                }
            }
        }

        self.prompter.say("\nProcessing...")?;
        let summary = update_file(&input, &output, &field_name, &value)?;
        self.print_summary(&field_name, &output, &summary)?;

        let chase = match request.mode {
            Mode::Chase => Some(self.run_chase(&output)?),
            _ => None,
        };

        Ok(Outcome::Completed(Report {
            input,
            output,
            field_name,
            value,
            summary,
            chase,
        }))
    }

    fn resolve_input(&mut self, mut candidate: Option<PathBuf>, output: Option<&Path>) -> Result<Option<PathBuf>> {
        loop {
            if let Some(input) = candidate.take().filter(|p| !p.as_os_str().is_empty()) {
                match output {
                    Some(output) if same_file(&input, output) => self.prompter.say(SAME_FILE_ERROR)?,
                    _ => return Ok(Some(input)),
                }
            }

            self.prompter.say(format!(
                "\nUSAGE: {} <input_file> <output_file> <value> <field_name>",
                self.program
            ))?;
            match self.prompter.ask("\nEnter INPUT ADIF file path or Q to QUIT: ")? {
                Answer::Quit => return Ok(None),
                Answer::Text(text) => candidate = Some(PathBuf::from(text)),
            }
        }
    }

    fn resolve_output(&mut self, mut candidate: Option<PathBuf>, input: &Path) -> Result<Option<PathBuf>> {
        loop {
            if let Some(output) = candidate.take().filter(|p| !p.as_os_str().is_empty()) {
                if !same_file(input, &output) {
                    return Ok(Some(output));
                }
                self.prompter.say(SAME_FILE_ERROR)?;
            }

            let default = default_output_path(input);
            let question = format!("Enter OUTPUT file path (default: {}): ", default.display());
            match self.prompter.ask(question)? {
                Answer::Quit => return Ok(None),
                Answer::Text(text) if text.is_empty() => candidate = Some(default),
                Answer::Text(text) => candidate = Some(PathBuf::from(text)),
            }
        }
    }

    /// Drive the value state machine until it confirms or aborts
    ///
    /// A `trusted` value (the configured default) skips the activity check.
    fn resolve_value(&mut self, value: Option<String>, trusted: bool) -> Result<Option<String>> {
        let mut state = match value {
            Some(value) if trusted => ValueState::Confirmed(value),
            Some(value) => ValueState::Validating(value.trim().to_uppercase()),
            None => ValueState::AwaitingValue,
        };

        loop {
            state = match state {
                ValueState::Confirmed(value) => return Ok(Some(value)),
                ValueState::Aborted => return Ok(None),
                pending => self.step_value(pending)?,
            };
        }
    }

    /// Advance the value state machine by one step
    pub fn step_value(&mut self, state: ValueState) -> Result<ValueState> {
        let config = self.config;

        let next = match state {
            ValueState::AwaitingValue => {
                let question = format!(
                    "\nEnter text for the field (ex {}) [q to quit]: ",
                    config.activity_list("|")
                );
                match self.prompter.ask(question)? {
                    Answer::Quit => ValueState::Aborted,
                    Answer::Text(text) => ValueState::Validating(text.to_uppercase()),
                }
            }
            ValueState::Validating(value) if !is_valid_value(&value) => {
                self.prompter.say(format!("\nInvalid value '{}': '<' and '>' are not allowed", value))?;
                ValueState::AwaitingValue
            }
            ValueState::Validating(value) if config.is_known_activity(&value) => ValueState::Confirmed(value),
            ValueState::Validating(value) => {
                self.prompter.say(format!(
                    "\nI expected one of the following: {}.",
                    config.activity_list(", ")
                ))?;
                match self.prompter.ask("Do you want to OVERRIDE?: (y/n): ")? {
                    Answer::Quit => ValueState::Aborted,
                    answer if answer.is_yes() => ValueState::Confirmed(value),
                    _ => ValueState::AwaitingValue,
                }
            }
            done => done,
        };

        debug!(state = ?next, "value prompt");
        Ok(next)
    }

    fn resolve_field_name(&mut self, name: Option<String>) -> Result<Option<String>> {
        let mut candidate = name.map(|n| canonical_name(n.trim())).filter(|n| !n.is_empty());
        let default = canonical_name(&self.config.defaults.field_name);

        loop {
            if let Some(name) = candidate.take() {
                if is_valid_name(&name) {
                    return Ok(Some(name));
                }
                self.prompter.say(format!(
                    "\nInvalid field name '{}': use letters, digits and underscores only",
                    name
                ))?;
            }

            let question = format!("Enter field name to add or update (default: {}, q to Quit): ", default);
            match self.prompter.ask(question)? {
                Answer::Quit => return Ok(None),
                Answer::Text(text) if text.is_empty() => candidate = Some(default.clone()),
                Answer::Text(text) => candidate = Some(canonical_name(&text)),
            }
        }
    }

    /// Second pass of `--chase`: set the grid square on the first output
    fn run_chase(&mut self, source: &Path) -> Result<ChaseReport> {
        let config = self.config;
        let chase = &config.chase;
        let field = Field::new(&chase.grid_field, chase.grid_square.as_str());

        self.prompter.say(format!("\nSetting {} in {}...", field, chase.output_path.display()))?;
        let summary = update_file(source, &chase.output_path, &field.name, &field.value)?;
        self.print_summary(&field.name, &chase.output_path, &summary)?;

        Ok(ChaseReport {
            output: chase.output_path.clone(),
            field_name: field.name,
            summary,
        })
    }

    fn print_summary(&mut self, field_name: &str, output: &Path, summary: &EditSummary) -> Result<()> {
        self.prompter.say(format!("✅ Successfully processed {} records", summary.records))?;
        self.prompter.say(format!("  - Added {} to {} records", field_name, summary.added))?;
        self.prompter.say(format!("  - Updated {} in {} records", field_name, summary.updated))?;
        self.prompter.say(format!("✅ Output written to: {}", output.display()))?;
        Ok(())
    }

    fn quit(&mut self) -> Result<Outcome> {
        self.prompter.say("\nQuitting.")?;
        Ok(Outcome::Quit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use std::fs;
    use std::io::Cursor;
    use tempfile::TempDir;

    const LOG: &str = "Test log <EOH>\n<CALL:4>W1AW <EOR>\n<CALL:5>K1ABC <OTHER:4>POTA <EOR>\n";

    fn setup() -> (TempDir, PathBuf) {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("log.adi");
        fs::write(&input, LOG).unwrap();
        (dir, input)
    }

    fn forced_config(dir: &TempDir) -> Config {
        let mut config = Config::default();
        config.defaults.output_path = dir.path().join("foo.adi");
        config.chase.output_path = dir.path().join("foo_grid.adi");
        config
    }

    fn run(config: &Config, answers: &str, request: Request) -> (Result<Outcome>, String) {
        let prompter = Prompter::new(Cursor::new(answers.to_string()), Vec::new());
        let mut session = Session::new(config, prompter);
        let outcome = session.run(request);
        let (_, output) = session.into_prompter().into_inner();
        (outcome, String::from_utf8(output).unwrap())
    }

    #[test]
    fn test_all_arguments_confirmed() {
        let (dir, input) = setup();
        let output = dir.path().join("out.adi");
        let config = Config::default();
        let request = Request {
            input: Some(input),
            output: Some(output.clone()),
            value: Some("sota".to_string()),
            field_name: Some("other".to_string()),
            mode: Mode::Interactive,
        };

        let (outcome, transcript) = run(&config, "y\n", request);
        let Outcome::Completed(report) = outcome.unwrap() else {
            panic!("expected completion: {}", transcript);
        };
        assert_eq!(report.value, "SOTA");
        assert_eq!(report.field_name, "OTHER");
        assert_eq!(report.summary, EditSummary { records: 2, added: 1, updated: 1 });
        assert!(transcript.contains("Will add/update <OTHER:4>SOTA to all records"));
        assert!(transcript.contains("✅ Successfully processed 2 records"));

        let written = fs::read_to_string(&output).unwrap();
        assert_eq!(
            written,
            "Test log <EOH>\n<CALL:4>W1AW <OTHER:4>SOTA <EOR>\n<CALL:5>K1ABC <OTHER:4>SOTA <EOR>\n"
        );
    }

    #[test]
    fn test_prompts_for_everything() {
        let (dir, input) = setup();
        let config = Config::default();
        let answers = format!("{}\n\npota\n\ny\n", input.display());

        let (outcome, transcript) = run(&config, &answers, Request::default());
        let Outcome::Completed(report) = outcome.unwrap() else {
            panic!("expected completion: {}", transcript);
        };
        assert_eq!(report.output, dir.path().join("log_updated.adi"));
        assert_eq!(report.value, "POTA");
        assert_eq!(report.field_name, "OTHER");
        assert!(transcript.contains("Enter INPUT ADIF file path or Q to QUIT: "));
        assert!(transcript.contains("Enter OUTPUT file path (default: "));
        assert!(report.output.exists());
    }

    #[test]
    fn test_unknown_value_declined_then_reentered() {
        let (dir, input) = setup();
        let config = Config::default();
        let request = Request {
            input: Some(input),
            output: Some(dir.path().join("out.adi")),
            value: Some("wwff".to_string()),
            field_name: Some("OTHER".to_string()),
            mode: Mode::Interactive,
        };

        let (outcome, transcript) = run(&config, "n\nhunt\ny\n", request);
        let Outcome::Completed(report) = outcome.unwrap() else {
            panic!("expected completion: {}", transcript);
        };
        assert_eq!(report.value, "HUNT");
        assert!(transcript.contains("I expected one of the following: SOTA, POTA, SPOTA, CHASE, HUNT, FIELD, CONTEST."));
    }

    #[test]
    fn test_unknown_value_overridden() {
        let (dir, input) = setup();
        let config = Config::default();
        let request = Request {
            input: Some(input),
            output: Some(dir.path().join("out.adi")),
            value: Some("wwff".to_string()),
            field_name: Some("SIG".to_string()),
            mode: Mode::Interactive,
        };

        let (outcome, _) = run(&config, "Y\ny\n", request);
        let Outcome::Completed(report) = outcome.unwrap() else {
            panic!("expected completion");
        };
        assert_eq!(report.value, "WWFF");
        assert_eq!(report.summary.added, 2);
    }

    #[test]
    fn test_value_with_tag_characters_reprompted() {
        let (dir, input) = setup();
        let output = dir.path().join("out.adi");
        let config = Config::default();
        let request = Request {
            input: Some(input),
            output: Some(output.clone()),
            value: Some("a<b".to_string()),
            field_name: Some("OTHER".to_string()),
            mode: Mode::Interactive,
        };

        let (outcome, transcript) = run(&config, "x>y\nsota\ny\n", request);
        let Outcome::Completed(report) = outcome.unwrap() else {
            panic!("expected completion: {}", transcript);
        };
        assert_eq!(report.value, "SOTA");
        assert!(transcript.contains("Invalid value 'A<B'"));
        assert!(transcript.contains("Invalid value 'X>Y'"));

        let written = fs::read_to_string(&output).unwrap();
        assert!(!written.contains("A<B"));
        assert!(!written.contains("X>Y"));
        assert_eq!(written.matches("<OTHER:4>SOTA").count(), 2);
    }

    #[test]
    fn test_forced_value_with_tag_characters_is_an_error() {
        let (dir, input) = setup();
        let mut config = forced_config(&dir);
        config.defaults.value = String::from("<EOR>");
        let request = Request {
            input: Some(input),
            mode: Mode::Force,
            ..Request::default()
        };

        let (outcome, _) = run(&config, "", request);
        assert!(matches!(outcome, Err(Error::InvalidFieldValue(_))));
        assert!(!dir.path().join("foo.adi").exists());
    }

    #[test]
    fn test_quit_at_value_prompt() {
        let (dir, input) = setup();
        let output = dir.path().join("out.adi");
        let config = Config::default();
        let request = Request {
            input: Some(input),
            output: Some(output.clone()),
            ..Request::default()
        };

        let (outcome, transcript) = run(&config, "q\n", request);
        assert_eq!(outcome.unwrap(), Outcome::Quit);
        assert!(transcript.ends_with("Quitting.\n"));
        assert!(!output.exists());
    }

    #[test]
    fn test_confirmation_declined() {
        let (dir, input) = setup();
        let output = dir.path().join("out.adi");
        let config = Config::default();
        let request = Request {
            input: Some(input),
            output: Some(output.clone()),
            value: Some("SOTA".to_string()),
            field_name: Some("OTHER".to_string()),
            mode: Mode::Interactive,
        };

        let (outcome, transcript) = run(&config, "n\n", request);
        assert_eq!(outcome.unwrap(), Outcome::Cancelled);
        assert!(transcript.contains("Operation cancelled"));
        assert!(!output.exists());
    }

    #[test]
    fn test_invalid_field_name_reprompted() {
        let (dir, input) = setup();
        let config = Config::default();
        let request = Request {
            input: Some(input),
            output: Some(dir.path().join("out.adi")),
            value: Some("SOTA".to_string()),
            field_name: Some("MY GRID".to_string()),
            mode: Mode::Interactive,
        };

        let (outcome, transcript) = run(&config, "sig_info\ny\n", request);
        let Outcome::Completed(report) = outcome.unwrap() else {
            panic!("expected completion");
        };
        assert_eq!(report.field_name, "SIG_INFO");
        assert!(transcript.contains("Invalid field name 'MY GRID'"));
    }

    #[test]
    fn test_same_input_and_output_reprompts() {
        let (dir, input) = setup();
        let other = dir.path().join("other.adi");
        fs::write(&other, "<CALL:4>W1AW <EOR>\n").unwrap();
        let config = Config::default();
        let request = Request {
            input: Some(input.clone()),
            output: Some(input.clone()),
            value: Some("SOTA".to_string()),
            field_name: Some("OTHER".to_string()),
            mode: Mode::Interactive,
        };

        let answers = format!("{}\ny\n", other.display());
        let (outcome, transcript) = run(&config, &answers, request);
        let Outcome::Completed(report) = outcome.unwrap() else {
            panic!("expected completion: {}", transcript);
        };
        assert!(transcript.contains("INPUT FILE CAN NOT EQUAL OUTPUT FILE NAME"));
        assert_eq!(report.input, other);
        assert_eq!(report.output, input);
        assert_eq!(fs::read_to_string(&input).unwrap(), "<CALL:4>W1AW <OTHER:4>SOTA <EOR>\n");
    }

    #[test]
    fn test_force_uses_defaults_without_prompting() {
        let (dir, input) = setup();
        let config = forced_config(&dir);
        let request = Request {
            input: Some(input),
            mode: Mode::Force,
            ..Request::default()
        };

        let (outcome, transcript) = run(&config, "", request);
        let Outcome::Completed(report) = outcome.unwrap() else {
            panic!("expected completion: {}", transcript);
        };
        assert_eq!(report.output, dir.path().join("foo.adi"));
        assert_eq!(report.value, "SOTA");
        assert!(report.chase.is_none());
        assert!(!transcript.contains("Proceed?"));
        assert!(transcript.starts_with("=== ADIF Field Updater ==="));
    }

    #[test]
    fn test_chase_writes_grid_pass() {
        let (dir, input) = setup();
        let config = forced_config(&dir);
        let request = Request {
            input: Some(input),
            mode: Mode::Chase,
            ..Request::default()
        };

        let (outcome, transcript) = run(&config, "", request);
        let Outcome::Completed(report) = outcome.unwrap() else {
            panic!("expected completion: {}", transcript);
        };
        let chase = report.chase.unwrap();
        assert_eq!(chase.field_name, "MY_GRIDSQUARE");
        assert!(transcript.contains("Setting <MY_GRIDSQUARE:4>FN31 in "));
        assert_eq!(chase.summary, EditSummary { records: 2, added: 2, updated: 0 });

        let written = fs::read_to_string(dir.path().join("foo_grid.adi")).unwrap();
        assert_eq!(
            written,
            "Test log <EOH>\n<CALL:4>W1AW <OTHER:4>SOTA <MY_GRIDSQUARE:4>FN31 <EOR>\n\
<CALL:5>K1ABC <OTHER:4>SOTA <MY_GRIDSQUARE:4>FN31 <EOR>\n"
        );
    }

    #[test]
    fn test_missing_input_is_an_error() {
        let dir = TempDir::new().unwrap();
        let config = Config::default();
        let request = Request {
            input: Some(dir.path().join("missing.adi")),
            output: Some(dir.path().join("out.adi")),
            value: Some("SOTA".to_string()),
            field_name: Some("OTHER".to_string()),
            mode: Mode::Interactive,
        };

        let (outcome, _) = run(&config, "y\n", request);
        assert!(matches!(outcome, Err(Error::InputNotFound(_))));
    }

    #[test]
    fn test_step_value_transitions() {
        let config = Config::default();
        let prompter = Prompter::new(Cursor::new("q\nn\ny\nfield\n".to_string()), Vec::new());
        let mut session = Session::new(&config, prompter);

        assert_eq!(
            session.step_value(ValueState::Validating("SOTA".to_string())).unwrap(),
            ValueState::Confirmed("SOTA".to_string())
        );
        assert_eq!(session.step_value(ValueState::AwaitingValue).unwrap(), ValueState::Aborted);
        assert_eq!(
            session.step_value(ValueState::Validating("X".to_string())).unwrap(),
            ValueState::AwaitingValue
        );
        assert_eq!(
            session.step_value(ValueState::Validating("X".to_string())).unwrap(),
            ValueState::Confirmed("X".to_string())
        );
        assert_eq!(
            session.step_value(ValueState::AwaitingValue).unwrap(),
            ValueState::Validating("FIELD".to_string())
        );
        assert_eq!(session.step_value(ValueState::Aborted).unwrap(), ValueState::Aborted);
        assert_eq!(
            session.step_value(ValueState::Validating("A<B".to_string())).unwrap(),
            ValueState::AwaitingValue
        );
    }
}
