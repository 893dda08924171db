//! Terminal path prompts, standing in for native file-picker dialogs.

use std::io::{BufRead, IsTerminal, Write};
use std::path::{Path, PathBuf};

use hostfilter_core::PathProvider;
use indicatif::ProgressBar;

/// Paths from CLI flags, asking on stdin for whatever was not given.
pub(crate) struct PromptPaths {
    input: Option<PathBuf>,
    output: Option<PathBuf>,
    interactive: bool,
    spinner: Option<ProgressBar>,
}

impl PromptPaths {
    /// Prompting is enabled only when `allow_prompt` is set and stdin is a terminal.
    pub(crate) fn new(input: Option<PathBuf>, output: Option<PathBuf>, allow_prompt: bool) -> Self {
        Self {
            input,
            output,
            interactive: allow_prompt && std::io::stdin().is_terminal(),
            spinner: None,
        }
    }

    /// Pause `spinner` while a prompt is on screen.
    pub(crate) fn with_spinner(mut self, spinner: ProgressBar) -> Self {
        self.spinner = Some(spinner);
        self
    }

    fn ask(&self, question: &str) -> Option<PathBuf> {
        if !self.interactive {
            return None;
        }
        match &self.spinner {
            Some(bar) => bar.suspend(|| ask_path(question)),
            None => ask_path(question),
        }
    }
}

impl PathProvider for PromptPaths {
    fn input_path(&self) -> Option<PathBuf> {
        self.input
            .clone()
            .or_else(|| self.ask("CSV file to filter (blank to cancel): "))
    }

    fn output_path(&self, default: &Path) -> Option<PathBuf> {
        self.output.clone().or_else(|| {
            self.ask(&format!(
                "Save filtered CSV as (blank for {}): ",
                default.display()
            ))
        })
    }
}

/// Ask for a folder path, if stdin is a terminal.
pub(crate) fn ask_folder(allow_prompt: bool) -> Option<PathBuf> {
    if !allow_prompt || !std::io::stdin().is_terminal() {
        return None;
    }
    ask_path("Enter the path of the folder containing the files to merge: ")
}

/// Print `question` on stderr and read one line. Blank answers and read
/// failures are `None`. Surrounding quotes (as pasted from Explorer) are removed.
fn ask_path(question: &str) -> Option<PathBuf> {
    let mut stderr = std::io::stderr();
    let _ = write!(stderr, "{question}");
    let _ = stderr.flush();

    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line).ok()?;
    parse_answer(&line)
}

fn parse_answer(line: &str) -> Option<PathBuf> {
    let answer = line.trim().trim_matches('"').trim();
    (!answer.is_empty()).then(|| PathBuf::from(answer))
}
