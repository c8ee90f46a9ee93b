//! Core mutation/reconciliation engine for the tally progress tracker.
//!
//! The [`registry`] declares the shape and quirks of every tracked plan as
//! data; the [`engine`] applies single-item completion changes, bulk
//! imports, and resets against a [`tally_store::store::DocumentStore`]; the
//! [`summary`] module recomputes derived counters after every mutation.

pub mod engine;
pub mod error;
pub mod registry;
pub mod summary;

pub use engine::{ProgressEngine, UpdateOutcome, UpdateRequest};
pub use error::TrackError;
pub use registry::{Denominator, Layout, PlanRegistry, PlanSpec};
