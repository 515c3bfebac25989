//! Presentation-level configuration
//!
//! Resolves console settings from command-line flags and the `[output]`
//! config section. Flags win over the file.

use crate::cli::commands::OutputFormat as FormatArg;
use tally_domain::OutputFormat;

/// How round progress is shown
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressMode {
    /// indicatif progress bar
    Bar,
    /// One plain line per vote
    Lines,
    Off,
}

/// Output configuration for the presentation layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputConfig {
    pub format: OutputFormat,
    /// Enable colored terminal output
    pub color: bool,
    /// Show a progress bar while workers run
    pub show_progress: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::default(),
            color: true,
            show_progress: true,
        }
    }
}

impl OutputConfig {
    /// Start from the file settings
    pub fn from_file(format: Option<OutputFormat>, color: bool, show_progress: bool) -> Self {
        Self {
            format: format.unwrap_or_default(),
            color,
            show_progress,
        }
    }

    /// Apply `--format` and `--quiet`
    pub fn with_flags(mut self, format: Option<FormatArg>, quiet: bool) -> Self {
        if let Some(format) = format {
            self.format = format.into();
        }
        if quiet {
            self.show_progress = false;
        }
        // Progress would interleave with machine-readable output
        if self.format == OutputFormat::Json {
            self.show_progress = false;
        }
        self
    }

    /// Progress display for the given stderr; bars need a terminal
    pub fn progress_mode(&self, stderr_is_terminal: bool) -> ProgressMode {
        if !self.show_progress {
            ProgressMode::Off
        } else if stderr_is_terminal && self.color {
            ProgressMode::Bar
        } else {
            ProgressMode::Lines
        }
    }

    /// Apply the color setting to every formatter in the process
    pub fn apply_color(&self) {
        if !self.color {
            colored::control::set_override(false);
        }
    }
}
