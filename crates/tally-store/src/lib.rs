//! Document model and persistence for the tally progress tracker.
//!
//! One JSON document holds every tracked plan. [`store::DocumentStore`] is
//! the seam between the mutation engine and stable storage: a file-backed
//! implementation for production and an in-memory fake for tests.

pub mod document;
pub mod error;
pub mod store;
