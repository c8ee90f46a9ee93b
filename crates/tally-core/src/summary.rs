//! Summary reconciliation.
//!
//! Summaries are never patched incrementally: after any mutation the owning
//! plan's body is re-scanned in full. The scans are tiny (hundreds of items
//! at most), so correctness wins over micro-optimization.

use serde::Serialize;

use tally_store::document::{Document, PlanBody, Summary};

use crate::registry::{Denominator, PlanSpec};

/// Round-half-up integer percentage, clamped to 100. Zero when `total` is 0,
/// so an empty plan never divides by zero.
pub fn percentage(completed: u64, total: u64) -> u8 {
    if total == 0 {
        return 0;
    }
    (((200 * completed + total) / (2 * total)).min(100)) as u8
}

/// Recompute a plan's summary from its current body.
pub fn reconcile(spec: &PlanSpec, body: &PlanBody) -> Summary {
    let observed = body.iter_items().count() as u64;
    let completed = body.iter_items().filter(|i| i.completed).count() as u64;

    let total = match spec.denominator {
        Denominator::Observed => observed,
        Denominator::Fixed(n) => n,
        Denominator::AtLeast(n) => n.max(observed),
    };
    // Lazy creation can push a flat pool past a fixed denominator; the
    // total floors at the completed count so 0 <= completed <= total holds.
    let total = total.max(completed);

    Summary {
        total_items: total,
        completed_items: completed,
        percentage: percentage(completed, total),
    }
}

/// Running completed count and percentage across every plan's summary.
/// Returned alongside mutations on flat item pools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverallProgress {
    pub completed_items: u64,
    pub total_items: u64,
    pub percentage: u8,
}

/// Aggregate the document's per-plan summaries into one overall figure.
pub fn overall(doc: &Document) -> OverallProgress {
    let completed = doc.summary.values().map(|s| s.completed_items).sum();
    let total = doc.summary.values().map(|s| s.total_items).sum();
    OverallProgress {
        completed_items: completed,
        total_items: total,
        percentage: percentage(completed, total),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use chrono::Utc;

    use tally_store::document::{Group, Item};

    use crate::registry::Layout;

    use super::*;

    fn flat_body(total: usize, completed: usize) -> PlanBody {
        let mut items = BTreeMap::new();
        for i in 0..total {
            let id = format!("item-{i}");
            let mut item = Item::new(&id);
            if i < completed {
                item.set_completed(true, Utc::now());
            }
            items.insert(id, item);
        }
        PlanBody::Flat { items }
    }

    #[test]
    fn percentage_rounds_half_up() {
        assert_eq!(percentage(2, 3), 67);
        assert_eq!(percentage(1, 3), 33);
        assert_eq!(percentage(5, 40), 13);
        assert_eq!(percentage(1, 8), 13);
        assert_eq!(percentage(1, 200), 1);
        assert_eq!(percentage(0, 10), 0);
        assert_eq!(percentage(10, 10), 100);
    }

    #[test]
    fn percentage_of_empty_plan_is_zero() {
        assert_eq!(percentage(0, 0), 0);
    }

    #[test]
    fn percentage_never_exceeds_100() {
        // A flat pool can outgrow a fixed denominator via lazy creation.
        assert_eq!(percentage(120, 100), 100);
    }

    #[test]
    fn fixed_denominator_floors_at_the_completed_count() {
        let spec = PlanSpec::new("p", Layout::Flat, Denominator::Fixed(40));
        let summary = reconcile(&spec, &flat_body(45, 45));
        assert_eq!(summary.completed_items, 45);
        assert_eq!(summary.total_items, 45, "total must never trail completed");
        assert_eq!(summary.percentage, 100);
    }

    #[test]
    fn reconcile_observed_counts_items() {
        let spec = PlanSpec::new("p", Layout::Flat, Denominator::Observed);
        let summary = reconcile(&spec, &flat_body(8, 2));
        assert_eq!(summary.total_items, 8);
        assert_eq!(summary.completed_items, 2);
        assert_eq!(summary.percentage, 25);
    }

    #[test]
    fn reconcile_fixed_ignores_observed_count() {
        let spec = PlanSpec::new("p", Layout::Flat, Denominator::Fixed(40));
        let summary = reconcile(&spec, &flat_body(5, 5));
        assert_eq!(summary.total_items, 40);
        assert_eq!(summary.completed_items, 5);
        assert_eq!(summary.percentage, 13);
    }

    #[test]
    fn reconcile_at_least_floors_the_denominator() {
        let spec = PlanSpec::new("p", Layout::Flat, Denominator::AtLeast(7));
        let below = reconcile(&spec, &flat_body(3, 0));
        assert_eq!(below.total_items, 7);

        let above = reconcile(&spec, &flat_body(12, 0));
        assert_eq!(above.total_items, 12);
    }

    #[test]
    fn reconcile_nested_scans_every_group() {
        let mut groups = BTreeMap::new();
        let mut first = Group::default();
        let mut done = Item::new("a1");
        done.set_completed(true, Utc::now());
        first.items.insert("a1".to_string(), done);
        first.items.insert("a2".to_string(), Item::new("a2"));
        groups.insert("alpha".to_string(), first);

        let mut second = Group::default();
        let mut done = Item::new("b1");
        done.set_completed(true, Utc::now());
        second.items.insert("b1".to_string(), done);
        groups.insert("beta".to_string(), second);

        let spec = PlanSpec::new("p", Layout::NestedSearch, Denominator::Observed);
        let summary = reconcile(&spec, &PlanBody::Nested { groups });
        assert_eq!(summary.total_items, 3);
        assert_eq!(summary.completed_items, 2);
        assert_eq!(summary.percentage, 67);
    }

    #[test]
    fn overall_sums_every_plan_summary() {
        let mut doc = Document::default();
        doc.summary.insert(
            "a".to_string(),
            Summary {
                total_items: 10,
                completed_items: 4,
                percentage: 40,
            },
        );
        doc.summary.insert(
            "b".to_string(),
            Summary {
                total_items: 30,
                completed_items: 2,
                percentage: 7,
            },
        );

        let overall = overall(&doc);
        assert_eq!(overall.completed_items, 6);
        assert_eq!(overall.total_items, 40);
        assert_eq!(overall.percentage, 15);
    }
}
