//! The persisted document shape.
//!
//! On disk this is a single pretty-printed JSON file with camelCase keys:
//! `metadata`, a `plans` map from plan name to plan body, and a `summary`
//! map from plan name to derived counters. Plan bodies come in two shapes,
//! distinguished structurally by their top-level key (`groups` vs `items`).

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Items
// ---------------------------------------------------------------------------

/// The smallest trackable unit: one checkbox.
///
/// Invariant: `completed_at` is present if and only if `completed` is true.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: String,
    /// Optional display name derived from the item id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub completed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl Item {
    /// A fresh, unchecked item -- what lazy creation materializes.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: None,
            completed: false,
            completed_at: None,
        }
    }

    /// Set or clear the completion flag, keeping `completed_at` in sync.
    pub fn set_completed(&mut self, completed: bool, now: DateTime<Utc>) {
        self.completed = completed;
        self.completed_at = if completed { Some(now) } else { None };
    }
}

// ---------------------------------------------------------------------------
// Plan bodies
// ---------------------------------------------------------------------------

/// A named sub-group of items within a nested plan (a topic or category).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub items: BTreeMap<String, Item>,
}

/// Polymorphic plan body: items nested under named groups, or a flat
/// id-to-item mapping. The serialized form discriminates by field name, so
/// the untagged representation is unambiguous.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PlanBody {
    Nested { groups: BTreeMap<String, Group> },
    Flat { items: BTreeMap<String, Item> },
}

impl PlanBody {
    /// An empty nested body.
    pub fn empty_nested() -> Self {
        Self::Nested {
            groups: BTreeMap::new(),
        }
    }

    /// An empty flat body.
    pub fn empty_flat() -> Self {
        Self::Flat {
            items: BTreeMap::new(),
        }
    }

    /// The group map, or `None` for flat bodies.
    pub fn groups(&self) -> Option<&BTreeMap<String, Group>> {
        match self {
            Self::Nested { groups } => Some(groups),
            Self::Flat { .. } => None,
        }
    }

    /// Mutable group map, or `None` for flat bodies.
    pub fn groups_mut(&mut self) -> Option<&mut BTreeMap<String, Group>> {
        match self {
            Self::Nested { groups } => Some(groups),
            Self::Flat { .. } => None,
        }
    }

    /// The flat item map, or `None` for nested bodies.
    pub fn items(&self) -> Option<&BTreeMap<String, Item>> {
        match self {
            Self::Flat { items } => Some(items),
            Self::Nested { .. } => None,
        }
    }

    /// Mutable flat item map, or `None` for nested bodies.
    pub fn items_mut(&mut self) -> Option<&mut BTreeMap<String, Item>> {
        match self {
            Self::Flat { items } => Some(items),
            Self::Nested { .. } => None,
        }
    }

    /// Iterate every item in the body, across all groups for nested plans.
    pub fn iter_items(&self) -> Box<dyn Iterator<Item = &Item> + '_> {
        match self {
            Self::Nested { groups } => {
                Box::new(groups.values().flat_map(|g| g.items.values()))
            }
            Self::Flat { items } => Box::new(items.values()),
        }
    }

    /// Mutable iteration over every item in the body.
    pub fn iter_items_mut(&mut self) -> Box<dyn Iterator<Item = &mut Item> + '_> {
        match self {
            Self::Nested { groups } => {
                Box::new(groups.values_mut().flat_map(|g| g.items.values_mut()))
            }
            Self::Flat { items } => Box::new(items.values_mut()),
        }
    }
}

// ---------------------------------------------------------------------------
// Summary
// ---------------------------------------------------------------------------

/// Derived counters for one plan, recomputed after every mutation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub total_items: u64,
    pub completed_items: u64,
    /// 0-100, round-half-up of `100 * completed / total`; 0 when total is 0.
    pub percentage: u8,
}

// ---------------------------------------------------------------------------
// Document
// ---------------------------------------------------------------------------

/// Write metadata, stamped on every save.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<DateTime<Utc>>,
}

/// The single root aggregate persisted to disk.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    #[serde(default)]
    pub metadata: Metadata,
    #[serde(default)]
    pub plans: BTreeMap<String, PlanBody>,
    #[serde(default)]
    pub summary: BTreeMap<String, Summary>,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
