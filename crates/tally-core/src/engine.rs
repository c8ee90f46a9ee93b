//! The progress mutation engine.
//!
//! Every mutating operation is a full load-modify-save cycle against the
//! shared document: nothing is cached across requests. A single-writer gate
//! serializes those cycles, so two concurrent mutations cannot race on the
//! load-then-save window and silently drop one writer's update. Reads go
//! straight to the store; the atomic save means they always see a complete
//! document.

use chrono::Utc;
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::info;

use tally_store::document::{Document, Item, Summary};
use tally_store::store::DocumentStore;

use crate::error::TrackError;
use crate::registry::{Layout, PlanRegistry};
use crate::summary::{self, OverallProgress, reconcile};

// ---------------------------------------------------------------------------
// Request / outcome types
// ---------------------------------------------------------------------------

/// A single item-completion change, as parsed from a request body or CLI
/// arguments.
#[derive(Debug, Clone)]
pub struct UpdateRequest {
    pub plan: String,
    /// Required for group-addressed plans (`dsa`), ignored otherwise.
    pub group: Option<String>,
    pub item_id: String,
    pub completed: bool,
}

/// Echo of the identifying fields plus the refreshed summary.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOutcome {
    pub plan: String,
    pub item_id: String,
    pub completed: bool,
    pub summary: Summary,
    /// Running document-wide progress; present for flat item pools.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overall: Option<OverallProgress>,
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// Mutation and reconciliation over one shared progress document.
pub struct ProgressEngine<S> {
    store: S,
    registry: PlanRegistry,
    write_gate: Mutex<()>,
}

impl<S: DocumentStore> ProgressEngine<S> {
    pub fn new(store: S) -> Self {
        Self::with_registry(store, PlanRegistry::standard())
    }

    pub fn with_registry(store: S, registry: PlanRegistry) -> Self {
        Self {
            store,
            registry,
            write_gate: Mutex::new(()),
        }
    }

    pub fn registry(&self) -> &PlanRegistry {
        &self.registry
    }

    /// Read the full current document.
    pub async fn snapshot(&self) -> Result<Document, TrackError> {
        Ok(self.store.load().await?)
    }

    /// Apply one item-completion change and return the refreshed summary.
    pub async fn set_item_completion(
        &self,
        req: &UpdateRequest,
    ) -> Result<UpdateOutcome, TrackError> {
        let plan = req.plan.trim();
        if plan.is_empty() {
            return Err(TrackError::InvalidInput("plan".to_string()));
        }
        let item_id = req.item_id.trim();
        if item_id.is_empty() {
            return Err(TrackError::InvalidInput("itemId".to_string()));
        }

        let spec = self
            .registry
            .get(plan)
            .ok_or_else(|| TrackError::NotFound(format!("unknown plan {plan:?}")))?;

        // Group-addressed plans require the group up front, before any I/O.
        let group = match spec.layout {
            Layout::NestedGrouped => Some(
                req.group
                    .as_deref()
                    .map(str::trim)
                    .filter(|g| !g.is_empty())
                    .ok_or_else(|| TrackError::InvalidInput("group".to_string()))?,
            ),
            Layout::NestedSearch | Layout::Flat => None,
        };

        let _guard = self.write_gate.lock().await;
        let mut doc = self.store.load().await?;
        let now = Utc::now();

        match spec.layout {
            Layout::NestedSearch => {
                let body = doc
                    .plans
                    .get_mut(plan)
                    .ok_or_else(|| plan_missing(plan))?;
                let groups = body.groups_mut().ok_or_else(|| layout_mismatch(plan))?;
                // First group containing the id wins; ids are unique across
                // groups in practice.
                let item = groups
                    .values_mut()
                    .find_map(|g| g.items.get_mut(item_id))
                    .ok_or_else(|| {
                        TrackError::NotFound(format!(
                            "item {item_id:?} not found in plan {plan:?}"
                        ))
                    })?;
                item.set_completed(req.completed, now);
            }
            Layout::NestedGrouped => {
                let group = group.unwrap_or_default();
                let body = doc
                    .plans
                    .get_mut(plan)
                    .ok_or_else(|| plan_missing(plan))?;
                let groups = body.groups_mut().ok_or_else(|| layout_mismatch(plan))?;
                let entry = groups.get_mut(group).ok_or_else(|| {
                    TrackError::NotFound(format!(
                        "group {group:?} not found in plan {plan:?}"
                    ))
                })?;
                let item = entry.items.get_mut(item_id).ok_or_else(|| {
                    TrackError::NotFound(format!(
                        "item {item_id:?} not found in {plan:?}/{group:?}"
                    ))
                })?;
                item.set_completed(req.completed, now);
            }
            Layout::Flat => {
                // Explicit ensure-plan-exists step: flat sections are
                // created on first write.
                let body = doc
                    .plans
                    .entry(plan.to_string())
                    .or_insert_with(|| spec.empty_body());
                let items = body.items_mut().ok_or_else(|| layout_mismatch(plan))?;
                let item = items
                    .entry(item_id.to_string())
                    .or_insert_with(|| Item::new(item_id));
                item.set_completed(req.completed, now);
            }
        }

        let body = doc.plans.get(plan).ok_or_else(|| plan_missing(plan))?;
        let summary = reconcile(spec, body);
        doc.summary.insert(plan.to_string(), summary);

        let overall = match spec.layout {
            Layout::Flat => Some(summary::overall(&doc)),
            Layout::NestedSearch | Layout::NestedGrouped => None,
        };

        self.store.save(&mut doc).await?;

        Ok(UpdateOutcome {
            plan: plan.to_string(),
            item_id: item_id.to_string(),
            completed: req.completed,
            summary,
            overall,
        })
    }

    /// Replace the entire document verbatim (import). Shape validation
    /// happens at deserialization, before this is called.
    pub async fn bulk_replace(&self, mut doc: Document) -> Result<(), TrackError> {
        let _guard = self.write_gate.lock().await;
        self.store.save(&mut doc).await?;
        info!("progress document replaced by bulk import");
        Ok(())
    }

    /// Clear completion state across every registered plan and persist once.
    ///
    /// The save is a single atomic replace, so the reset is all-or-nothing:
    /// on failure the on-disk document is exactly as it was.
    pub async fn reset_all(&self) -> Result<(), TrackError> {
        let _guard = self.write_gate.lock().await;
        let mut doc = self.store.load().await?;
        let now = Utc::now();

        let mut plans_reset = 0usize;
        for spec in self.registry.iter() {
            match doc.plans.get_mut(spec.name.as_str()) {
                Some(body) => {
                    for item in body.iter_items_mut() {
                        item.set_completed(false, now);
                    }
                    let summary = reconcile(spec, body);
                    doc.summary.insert(spec.name.clone(), summary);
                    plans_reset += 1;
                }
                None => {
                    // A trimmed bulk import can drop a plan body while its
                    // summary entry lingers with stale counters.
                    if doc.summary.contains_key(spec.name.as_str()) {
                        let summary = reconcile(spec, &spec.empty_body());
                        doc.summary.insert(spec.name.clone(), summary);
                    }
                }
            }
        }

        self.store.save(&mut doc).await?;
        info!(plans = plans_reset, "all plan progress reset");
        Ok(())
    }
}

fn plan_missing(plan: &str) -> TrackError {
    TrackError::NotFound(format!("plan {plan:?} has no data section"))
}

/// The document's section for this plan has the wrong shape (nested where
/// flat is expected or vice versa) -- only possible after a malformed bulk
/// import.
fn layout_mismatch(plan: &str) -> TrackError {
    TrackError::NotFound(format!("plan {plan:?} has an unexpected layout on disk"))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
