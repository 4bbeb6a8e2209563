//! Aggregation of per-worker scan results.
//!
//! The scan phase produces one partial table per worker; this module
//! merges them into the final rectangular table.

pub mod aggregator;

pub use aggregator::*;
