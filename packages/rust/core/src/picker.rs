//! Where the input comes from and where the output goes.
//!
//! The pipeline never talks to a terminal or a windowing toolkit; it asks a
//! [`PathProvider`] instead.

use std::path::{Path, PathBuf};

/// Supplies the input and output file paths for a filter run.
pub trait PathProvider {
    /// The CSV to filter. `None` means the user cancelled.
    fn input_path(&self) -> Option<PathBuf>;

    /// Where to write the result. `None` means "use `default`".
    fn output_path(&self, default: &Path) -> Option<PathBuf>;
}

/// A provider with fixed answers.
#[derive(Debug, Clone, Default)]
pub struct StaticPaths {
    pub input: Option<PathBuf>,
    pub output: Option<PathBuf>,
}

impl StaticPaths {
    pub fn new(input: impl Into<PathBuf>) -> Self {
        Self {
            input: Some(input.into()),
            output: None,
        }
    }

    pub fn with_output(mut self, output: impl Into<PathBuf>) -> Self {
        self.output = Some(output.into());
        self
    }
}

impl PathProvider for StaticPaths {
    fn input_path(&self) -> Option<PathBuf> {
        self.input.clone()
    }

    fn output_path(&self, _default: &Path) -> Option<PathBuf> {
        self.output.clone()
    }
}
