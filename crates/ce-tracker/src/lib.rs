//! Continuing-education tracking and designation renewal compliance.
//!
//! The [`compliance`] module owns the designation rule tables and the pure
//! evaluator that turns a set of CE records into a compliance report. The
//! [`records`] module covers record ownership, analytics and backup
//! interchange around it.

pub mod compliance;
pub mod config;
pub mod error;
pub mod records;
pub mod telemetry;
