//! Console output formatter for round results

use crate::output::formatter::OutputFormatter;
use colored::Colorize;
use tally_domain::{AggregationResult, ConfigIssue, Decision, OperationConfig, Severity};

/// Formats round results for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Decision, strategy, tally and every vote
    pub fn format(result: &AggregationResult) -> String {
        let mut output = String::new();

        let title = if result.operation.is_empty() {
            "Tally".to_string()
        } else {
            format!("Tally: {}", result.operation)
        };
        output.push_str(&Self::header(&title));
        output.push('\n');

        output.push_str(&format!(
            "{} {}\n",
            "Decision:".cyan().bold(),
            Self::decision_line(result)
        ));
        output.push_str(&format!(
            "{} {}\n",
            "Strategy:".cyan().bold(),
            Self::strategy_line(result)
        ));
        output.push_str(&format!(
            "{} {}\n",
            "Votes:".cyan().bold(),
            Self::progress_line(result)
        ));

        output.push_str(&Self::section_header("Tally"));
        let width = result.tally.keys().map(String::len).max().unwrap_or(0);
        for (category, count) in &result.tally {
            output.push_str(&format!("  {:<width$}  {}\n", category, count, width = width));
        }
        if let Some(weighted) = &result.weighted_tally {
            for (category, weight) in weighted {
                output.push_str(&format!(
                    "  {:<width$}  {:.2} {}\n",
                    category,
                    weight,
                    "(weight)".dimmed(),
                    width = width
                ));
            }
        }

        if !result.votes.is_empty() {
            output.push_str(&Self::section_header("Votes"));
            for vote in &result.votes {
                let label = format!("#{}", vote.worker_index);
                if vote.is_abstain() {
                    let reason = vote
                        .abstain_reason
                        .map(|r| r.to_string())
                        .unwrap_or_else(|| "declined".to_string());
                    let detail = vote
                        .detail
                        .as_deref()
                        .map(|d| format!(": {}", d))
                        .unwrap_or_default();
                    output.push_str(&format!(
                        "  {} {} {}\n",
                        label.yellow(),
                        "abstain".dimmed(),
                        format!("({}{})", reason, detail).dimmed()
                    ));
                } else {
                    output.push_str(&format!("  {} {}\n", label.yellow(), vote.category));
                }
            }
        }

        output.push_str(&Self::footer());

        output
    }

    /// Format as JSON
    pub fn format_json(result: &AggregationResult) -> String {
        serde_json::to_string_pretty(result).unwrap_or_else(|_| "{}".to_string())
    }

    /// Decision and tally only (concise output)
    pub fn format_summary(result: &AggregationResult) -> String {
        format!(
            "{} {}  {}\n{}\n",
            "Decision:".bold(),
            Self::decision_line(result),
            result.vote_summary().dimmed(),
            result.explain()
        )
    }

    /// Configuration issues, one per line
    pub fn format_issues(issues: &[ConfigIssue]) -> String {
        issues
            .iter()
            .map(|issue| match issue.severity {
                Severity::Error => format!("{} {}", "error:".red().bold(), issue.message),
                Severity::Warning => {
                    format!("{} {}", "warning:".yellow().bold(), issue.message)
                }
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// One-line description of a configured operation
    pub fn format_operation(config: &OperationConfig) -> String {
        let mut line = format!(
            "{} {} workers={}",
            config.name().bold(),
            config.strategy().as_str().cyan(),
            config.num_workers()
        );
        if let Some(k) = config.k().filter(|_| config.strategy().requires_k()) {
            line.push_str(&format!(" k={}", k));
        }
        line.push_str(&format!(
            " timeout={}ms tie_break={}",
            config.per_worker_timeout().as_millis(),
            config.tie_break()
        ));
        if let Some(model) = config.model() {
            line.push_str(&format!(" model={}", model));
        }
        line
    }

    fn decision_line(result: &AggregationResult) -> String {
        let mut line = match &result.decision {
            Decision::Decided(category) => category.to_string().green().bold().to_string(),
            Decision::NoDecision => "no decision".red().bold().to_string(),
        };
        if result.tie_broken {
            line.push_str(&format!(" {}", "(tie broken)".yellow()));
        }
        if result.cancelled {
            line.push_str(&format!(" {}", "(cancelled)".yellow()));
        }
        line
    }

    fn strategy_line(result: &AggregationResult) -> String {
        let snapshot = &result.strategy_used;
        let mut line = format!("{}", snapshot.strategy);
        if let Some(k) = snapshot.k {
            line.push_str(&format!(" (k={})", k));
        }
        line.push_str(&format!(
            ", {} workers, tie-break {}",
            snapshot.num_workers, snapshot.tie_break
        ));
        line
    }

    fn progress_line(result: &AggregationResult) -> String {
        let mut line = format!(
            "{} of {} collected, margin {}",
            result.votes_collected, result.strategy_used.num_workers, result.margin_achieved
        );
        if result.early_stop {
            line.push_str(", early stop");
        }
        line
    }

    fn header(title: &str) -> String {
        let line = "=".repeat(60);
        format!("{}\n{:^60}\n{}", line.cyan(), title.bold(), line.cyan())
    }

    fn section_header(title: &str) -> String {
        format!("\n{}\n{}\n", title.cyan().bold(), "-".repeat(40))
    }

    fn footer() -> String {
        format!("{}\n", "=".repeat(60).cyan())
    }
}

impl OutputFormatter for ConsoleFormatter {
    fn format(&self, result: &AggregationResult) -> String {
        Self::format(result)
    }

    fn format_json(&self, result: &AggregationResult) -> String {
        Self::format_json(result)
    }

    fn format_summary(&self, result: &AggregationResult) -> String {
        Self::format_summary(result)
    }
}
