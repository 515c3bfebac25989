//! Running vote counts for a round

use super::vote::Vote;
use crate::core::category::{ABSTAIN, Category};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Tolerance for comparing summed weights.
const WEIGHT_EPSILON: f64 = 1e-9;

/// Per-category counters for one round.
///
/// Abstains are counted separately and never enter `counts`, so no
/// strategy can accidentally treat them as a category.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Tally {
    counts: BTreeMap<Category, usize>,
    weights: BTreeMap<Category, f64>,
    abstain: usize,
}

impl Tally {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a vote with unit weight
    pub fn record(&mut self, vote: &Vote) {
        self.record_weighted(vote, 1.0);
    }

    /// Record a vote contributing `weight` to its category's weighted sum
    pub fn record_weighted(&mut self, vote: &Vote, weight: f64) {
        if vote.is_abstain() {
            self.abstain += 1;
            return;
        }
        *self.counts.entry(vote.category.clone()).or_insert(0) += 1;
        *self.weights.entry(vote.category.clone()).or_insert(0.0) += weight;
    }

    /// Count for a category (abstain included)
    pub fn count(&self, category: &str) -> usize {
        if category == ABSTAIN {
            return self.abstain;
        }
        self.counts
            .iter()
            .find(|(c, _)| c.as_str() == category)
            .map(|(_, n)| *n)
            .unwrap_or(0)
    }

    pub fn abstain_count(&self) -> usize {
        self.abstain
    }

    /// Number of votes that landed in a real category
    pub fn non_abstain_total(&self) -> usize {
        self.counts.values().sum()
    }

    /// All votes recorded, abstains included
    pub fn total(&self) -> usize {
        self.non_abstain_total() + self.abstain
    }

    /// Number of distinct non-abstain categories seen
    pub fn distinct_categories(&self) -> usize {
        self.counts.len()
    }

    /// Non-abstain categories sorted by count (descending), then name
    pub fn ranked(&self) -> Vec<(&Category, usize)> {
        let mut ranked: Vec<_> = self.counts.iter().map(|(c, n)| (c, *n)).collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        ranked
    }

    /// Lead of the top category over the runner-up (0 when empty)
    pub fn margin(&self) -> usize {
        let ranked = self.ranked();
        match ranked.as_slice() {
            [] => 0,
            [(_, top)] => *top,
            [(_, top), (_, second), ..] => top - second,
        }
    }

    /// Every category holding the highest count
    pub fn leaders(&self) -> Vec<Category> {
        let Some(max) = self.counts.values().max().copied() else {
            return Vec::new();
        };
        self.counts
            .iter()
            .filter(|(_, n)| **n == max)
            .map(|(c, _)| c.clone())
            .collect()
    }

    /// Summed weight of every non-abstain vote
    pub fn total_weight(&self) -> f64 {
        self.weights.values().sum()
    }

    /// Every category holding the highest summed weight
    pub fn weight_leaders(&self) -> Vec<Category> {
        let max = self.weights.values().copied().fold(f64::MIN, f64::max);
        if self.weights.is_empty() || max <= 0.0 {
            return Vec::new();
        }
        self.weights
            .iter()
            .filter(|(_, w)| (max - **w).abs() < WEIGHT_EPSILON)
            .map(|(c, _)| c.clone())
            .collect()
    }

    /// Category → count, always including the abstain bucket
    pub fn to_map(&self) -> BTreeMap<String, usize> {
        let mut map: BTreeMap<String, usize> = self
            .counts
            .iter()
            .map(|(c, n)| (c.to_string(), *n))
            .collect();
        map.insert(ABSTAIN.to_string(), self.abstain);
        map
    }

    /// Category → summed weight
    pub fn weight_map(&self) -> BTreeMap<String, f64> {
        self.weights
            .iter()
            .map(|(c, w)| (c.to_string(), *w))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quorum::vote::AbstainReason;

    fn tally_of(categories: &[&str]) -> Tally {
        let mut tally = Tally::new();
        for (i, c) in categories.iter().enumerate() {
            tally.record(&Vote::cast(i, *c));
        }
        tally
    }

    #[test]
    fn test_abstain_is_isolated() {
        let mut tally = tally_of(&["approve", "reject"]);
        tally.record(&Vote::abstain(2, AbstainReason::Timeout));

        assert_eq!(tally.abstain_count(), 1);
        assert_eq!(tally.non_abstain_total(), 2);
        assert_eq!(tally.total(), 3);
        assert_eq!(tally.distinct_categories(), 2);
        assert_eq!(tally.to_map().get("abstain"), Some(&1));
    }

    #[test]
    fn test_abstain_bucket_always_present() {
        let tally = tally_of(&["approve"]);
        assert_eq!(tally.to_map().get("abstain"), Some(&0));
    }

    #[test]
    fn test_margin() {
        assert_eq!(Tally::new().margin(), 0);
        assert_eq!(tally_of(&["approve", "approve"]).margin(), 2);
        assert_eq!(tally_of(&["approve", "approve", "reject"]).margin(), 1);
        assert_eq!(
            tally_of(&["a", "a", "a", "b", "c", "c"]).margin(),
            1,
            "margin is against the runner-up, not the last place"
        );
    }

    #[test]
    fn test_leaders_reports_ties() {
        let tally = tally_of(&["approve", "reject", "defer"]);
        assert_eq!(tally.leaders().len(), 3);

        let tally = tally_of(&["approve", "approve", "reject"]);
        assert_eq!(tally.leaders(), vec![Category::new("approve")]);
    }

    #[test]
    fn test_weight_leaders() {
        let mut tally = Tally::new();
        tally.record_weighted(&Vote::cast(0, "approve"), 1.5);
        tally.record_weighted(&Vote::cast(1, "reject"), 1.0);
        tally.record_weighted(&Vote::cast(2, "approve"), 1.2);

        assert_eq!(tally.weight_leaders(), vec![Category::new("approve")]);
        assert!((tally.total_weight() - 3.7).abs() < 1e-9);
    }

    #[test]
    fn test_weight_leaders_ignores_zero_weight() {
        let mut tally = Tally::new();
        tally.record_weighted(&Vote::cast(0, "approve"), 0.0);
        assert!(tally.weight_leaders().is_empty());
    }

    #[test]
    fn test_count_lookup() {
        let tally = tally_of(&["approve", "approve", "abstain"]);
        assert_eq!(tally.count("approve"), 2);
        assert_eq!(tally.count("abstain"), 1);
        assert_eq!(tally.count("reject"), 0);
    }
}
