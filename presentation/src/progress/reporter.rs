//! Progress reporting for voting rounds

use crate::config::ProgressMode;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Mutex;
use tally_application::{NoProgress, VotingProgressNotifier};
use tally_domain::{AggregationResult, OperationConfig, Vote};

/// Reports progress during a round with a progress bar
pub struct ProgressReporter {
    bar: Mutex<Option<ProgressBar>>,
}

impl ProgressReporter {
    pub fn new() -> Self {
        Self {
            bar: Mutex::new(None),
        }
    }

    fn round_style() -> ProgressStyle {
        ProgressStyle::default_bar()
            .template("{spinner:.green} {prefix:.bold.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-")
    }

    fn vote_label(vote: &Vote) -> String {
        if vote.is_abstain() {
            let reason = vote
                .abstain_reason
                .map(|r| r.to_string())
                .unwrap_or_else(|| "declined".to_string());
            format!("{} #{} abstain ({})", "-".yellow(), vote.worker_index, reason)
        } else {
            format!("{} #{} {}", "v".green(), vote.worker_index, vote.category)
        }
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl VotingProgressNotifier for ProgressReporter {
    fn on_round_start(&self, config: &OperationConfig) {
        let pb = ProgressBar::new(config.num_workers() as u64);
        pb.set_style(Self::round_style());
        pb.set_prefix(format!("{} ({})", config.name(), config.strategy()));
        pb.set_message("Waiting for votes...");

        if let Ok(mut bar) = self.bar.lock() {
            *bar = Some(pb);
        }
    }

    fn on_vote(&self, vote: &Vote) {
        if let Ok(bar) = self.bar.lock()
            && let Some(pb) = bar.as_ref()
        {
            pb.set_message(Self::vote_label(vote));
            pb.inc(1);
        }
    }

    fn on_early_stop(&self, outstanding: usize) {
        if let Ok(bar) = self.bar.lock()
            && let Some(pb) = bar.as_ref()
        {
            pb.set_message(format!("early stop, {} workers cancelled", outstanding));
        }
    }

    fn on_round_complete(&self, result: &AggregationResult) {
        if let Ok(mut bar) = self.bar.lock()
            && let Some(pb) = bar.take()
        {
            pb.finish_with_message(format!("{} {}", "decision:".green(), result.decision));
        }
    }
}

/// Notifier for the given display mode
pub fn progress_for(mode: ProgressMode) -> Box<dyn VotingProgressNotifier> {
    match mode {
        ProgressMode::Bar => Box::new(ProgressReporter::new()),
        ProgressMode::Lines => Box::new(SimpleProgress),
        ProgressMode::Off => Box::new(NoProgress),
    }
}

/// Simple text-based progress (no fancy UI)
pub struct SimpleProgress;

impl VotingProgressNotifier for SimpleProgress {
    fn on_round_start(&self, config: &OperationConfig) {
        eprintln!(
            "{} {} ({}, {} workers)",
            "->".cyan(),
            config.name().bold(),
            config.strategy(),
            config.num_workers()
        );
    }

    fn on_vote(&self, vote: &Vote) {
        eprintln!("  {}", ProgressReporter::vote_label(vote));
    }

    fn on_early_stop(&self, outstanding: usize) {
        eprintln!("  {} early stop, {} workers cancelled", "!".yellow(), outstanding);
    }

    fn on_round_complete(&self, _result: &AggregationResult) {
        eprintln!();
    }
}
