//! Output formatter trait

use tally_domain::{AggregationResult, OutputFormat};

/// Trait for formatting round results
pub trait OutputFormatter {
    /// Decision, tally and every vote
    fn format(&self, result: &AggregationResult) -> String;

    /// Format as JSON
    fn format_json(&self, result: &AggregationResult) -> String;

    /// Decision and tally only (concise output)
    fn format_summary(&self, result: &AggregationResult) -> String;

    /// Dispatch on the configured format
    fn render(&self, result: &AggregationResult, format: OutputFormat) -> String {
        match format {
            OutputFormat::Full => self.format(result),
            OutputFormat::Summary => self.format_summary(result),
            OutputFormat::Json => self.format_json(result),
        }
    }
}
