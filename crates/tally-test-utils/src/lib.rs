//! Shared test fixtures for tally integration tests.
//!
//! Provides a seeded progress document with known contents and a helper to
//! stand up a [`FileStore`] on a temp directory. Tests that need the
//! document on disk use [`create_test_store`]; tests that only exercise the
//! engine use [`seed_document`] with an in-memory store.

use std::collections::BTreeMap;

use chrono::{TimeZone, Utc};
use tempfile::TempDir;

use tally_store::document::{Document, Group, Item, PlanBody};
use tally_store::store::FileStore;

/// A deterministic timestamp for pre-completed fixture items.
pub fn fixture_time() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 5, 10, 0, 0).unwrap()
}

fn item(id: &str, completed: bool) -> Item {
    let mut item = Item::new(id);
    if completed {
        item.set_completed(true, fixture_time());
    }
    item
}

fn group(name: &str, items: &[(&str, bool)]) -> Group {
    Group {
        name: Some(name.to_string()),
        items: items
            .iter()
            .map(|(id, done)| (id.to_string(), item(id, *done)))
            .collect(),
    }
}

fn flat(items: &[(&str, bool)]) -> PlanBody {
    PlanBody::Flat {
        items: items
            .iter()
            .map(|(id, done)| (id.to_string(), item(id, *done)))
            .collect(),
    }
}

/// A document with every stock plan populated:
///
/// - `systemDesign`: 3 concepts across 2 topics, none completed.
/// - `dsa`: 2 categories ("arrays", "graphs") with 2 problems each, none
///   completed.
/// - `patterns`: 5 items, none completed (denominator floors at 40).
/// - `threeMonthsPlan` / `questionBank`: 2 items each, none completed.
/// - `scripts`: 7 items, none completed.
///
/// Summaries are intentionally absent; the engine recomputes them on the
/// first mutation.
pub fn seed_document() -> Document {
    let mut plans = BTreeMap::new();

    let mut topics = BTreeMap::new();
    topics.insert(
        "fundamentals".to_string(),
        group(
            "Fundamentals",
            &[("load-balancing", false), ("caching", false)],
        ),
    );
    topics.insert(
        "storage".to_string(),
        group("Storage", &[("sharding", false)]),
    );
    plans.insert("systemDesign".to_string(), PlanBody::Nested { groups: topics });

    let mut categories = BTreeMap::new();
    categories.insert(
        "arrays".to_string(),
        group("Arrays", &[("two-sum", false), ("three-sum", false)]),
    );
    categories.insert(
        "graphs".to_string(),
        group("Graphs", &[("bfs", false), ("dfs", false)]),
    );
    plans.insert("dsa".to_string(), PlanBody::Nested { groups: categories });

    plans.insert(
        "patterns".to_string(),
        flat(&[
            ("sliding-window", false),
            ("two-pointers", false),
            ("fast-slow", false),
            ("merge-intervals", false),
            ("cyclic-sort", false),
        ]),
    );
    plans.insert(
        "threeMonthsPlan".to_string(),
        flat(&[("week1-day1", false), ("week1-day2", false)]),
    );
    plans.insert(
        "questionBank".to_string(),
        flat(&[("q-0001", false), ("q-0002", false)]),
    );
    plans.insert(
        "scripts".to_string(),
        flat(&[
            ("backup", false),
            ("deploy", false),
            ("lint", false),
            ("migrate", false),
            ("provision", false),
            ("rotate-logs", false),
            ("seed-db", false),
        ]),
    );

    Document {
        plans,
        ..Document::default()
    }
}

/// Write the seeded document to a temp directory and return a [`FileStore`]
/// pointing at it. Keep the [`TempDir`] alive for the duration of the test.
pub fn create_test_store() -> (FileStore, TempDir) {
    let tmp = TempDir::new().expect("failed to create temp dir");
    let path = tmp.path().join("progress.json");
    let doc = seed_document();
    let contents = render_pretty(&doc).expect("fixture document should serialize");
    std::fs::write(&path, contents).expect("failed to write fixture document");
    (FileStore::new(path), tmp)
}

/// The same 2-space pretty format the file store writes.
fn render_pretty(doc: &Document) -> Result<String, serde_json::Error> {
    let mut out = serde_json::to_string_pretty(doc)?;
    out.push('\n');
    Ok(out)
}
