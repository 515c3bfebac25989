//! Tie-break resolution

use crate::config::TieBreakPolicy;
use crate::core::category::{Category, REJECT};
use crate::round::Decision;

/// Resolve the set of leading categories into a decision.
///
/// Returns the decision and whether the tie-break policy produced it.
pub(crate) fn resolve(
    leaders: Vec<Category>,
    policy: TieBreakPolicy,
    conservative_order: &[Category],
) -> (Decision, bool) {
    match leaders.as_slice() {
        [] => (Decision::NoDecision, false),
        [only] => (Decision::Decided(only.clone()), false),
        tied => match policy {
            TieBreakPolicy::Reject => (Decision::Decided(Category::new(REJECT)), true),
            TieBreakPolicy::FavorConservativeOutcome => conservative_order
                .iter()
                .find(|c| tied.contains(c))
                .map(|c| (Decision::Decided(c.clone()), true))
                .unwrap_or((Decision::NoDecision, false)),
        },
    }
}
