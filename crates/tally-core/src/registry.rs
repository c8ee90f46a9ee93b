//! Declarative plan registry.
//!
//! The original tracker had one near-identical handler per plan, differing
//! only in where the items live, which denominator the percentage uses, and
//! whether unknown ids are an error. Here each plan is described as data --
//! a [`PlanSpec`] -- and one generic engine interprets it.

use tally_store::document::{Document, PlanBody};

use crate::summary::reconcile;

// ---------------------------------------------------------------------------
// Plan description
// ---------------------------------------------------------------------------

/// Where a plan keeps its items, and how a mutation locates them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// Items nested under named groups; a mutation names only the item and
    /// every group is searched. Items must pre-exist.
    NestedSearch,
    /// Items nested under named groups; a mutation must name the group,
    /// which must pre-exist. Items must pre-exist.
    NestedGrouped,
    /// Flat id-to-item mapping. Unknown ids are created lazily with
    /// `completed=false`, and the plan section itself is created on first
    /// write if absent.
    Flat,
}

/// How a plan's `totalItems` denominator is derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Denominator {
    /// Count of items currently present in the plan body.
    Observed,
    /// A fixed constant, independent of how many items exist.
    Fixed(u64),
    /// `max(n, observed item count)`.
    AtLeast(u64),
}

/// Declarative description of one tracked plan.
#[derive(Debug, Clone)]
pub struct PlanSpec {
    pub name: String,
    pub layout: Layout,
    pub denominator: Denominator,
}

impl PlanSpec {
    pub fn new(name: impl Into<String>, layout: Layout, denominator: Denominator) -> Self {
        Self {
            name: name.into(),
            layout,
            denominator,
        }
    }

    /// An empty body of the shape this plan expects.
    pub fn empty_body(&self) -> PlanBody {
        match self.layout {
            Layout::NestedSearch | Layout::NestedGrouped => PlanBody::empty_nested(),
            Layout::Flat => PlanBody::empty_flat(),
        }
    }
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// The set of plans the engine knows about. Unknown plan names are a hard
/// error; they are never created lazily.
#[derive(Debug, Clone)]
pub struct PlanRegistry {
    specs: Vec<PlanSpec>,
}

impl PlanRegistry {
    /// Build a registry from explicit specs (used by tests).
    pub fn with_specs(specs: Vec<PlanSpec>) -> Self {
        Self { specs }
    }

    /// The six plans of the stock tracker.
    pub fn standard() -> Self {
        Self::with_specs(vec![
            PlanSpec::new("systemDesign", Layout::NestedSearch, Denominator::Observed),
            PlanSpec::new("dsa", Layout::NestedGrouped, Denominator::Observed),
            PlanSpec::new("patterns", Layout::Flat, Denominator::AtLeast(40)),
            PlanSpec::new("threeMonthsPlan", Layout::Flat, Denominator::Fixed(100)),
            PlanSpec::new("questionBank", Layout::Flat, Denominator::Fixed(541)),
            PlanSpec::new("scripts", Layout::Flat, Denominator::AtLeast(7)),
        ])
    }

    pub fn get(&self, name: &str) -> Option<&PlanSpec> {
        self.specs.iter().find(|s| s.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &PlanSpec> {
        self.specs.iter()
    }

    /// A fresh document with an empty body and a zeroed summary for every
    /// registered plan. Fixed denominators show through immediately
    /// (e.g. `threeMonthsPlan` starts at 0/100).
    pub fn seed_document(&self) -> Document {
        let mut doc = Document::default();
        for spec in &self.specs {
            let body = spec.empty_body();
            doc.summary.insert(spec.name.clone(), reconcile(spec, &body));
            doc.plans.insert(spec.name.clone(), body);
        }
        doc
    }
}

impl Default for PlanRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_registry_has_six_plans() {
        let registry = PlanRegistry::standard();
        assert_eq!(registry.iter().count(), 6);
        assert!(registry.get("systemDesign").is_some());
        assert!(registry.get("dsa").is_some());
        assert!(registry.get("scripts").is_some());
        assert!(registry.get("bogus").is_none());
    }

    #[test]
    fn standard_denominators_match_the_tracked_pools() {
        let registry = PlanRegistry::standard();
        assert_eq!(
            registry.get("patterns").unwrap().denominator,
            Denominator::AtLeast(40)
        );
        assert_eq!(
            registry.get("threeMonthsPlan").unwrap().denominator,
            Denominator::Fixed(100)
        );
        assert_eq!(
            registry.get("questionBank").unwrap().denominator,
            Denominator::Fixed(541)
        );
        assert_eq!(
            registry.get("scripts").unwrap().denominator,
            Denominator::AtLeast(7)
        );
    }

    #[test]
    fn empty_body_matches_layout() {
        let nested = PlanSpec::new("n", Layout::NestedSearch, Denominator::Observed);
        assert!(nested.empty_body().groups().is_some());

        let flat = PlanSpec::new("f", Layout::Flat, Denominator::Observed);
        assert!(flat.empty_body().items().is_some());
    }

    #[test]
    fn seed_document_zeroes_summaries_but_keeps_fixed_totals() {
        let doc = PlanRegistry::standard().seed_document();
        assert_eq!(doc.plans.len(), 6);

        let three_months = &doc.summary["threeMonthsPlan"];
        assert_eq!(three_months.total_items, 100);
        assert_eq!(three_months.completed_items, 0);
        assert_eq!(three_months.percentage, 0);

        let system_design = &doc.summary["systemDesign"];
        assert_eq!(system_design.total_items, 0);
        assert_eq!(system_design.percentage, 0);
    }
}
