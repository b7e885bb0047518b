//! Market directory queries and vendor application intake for HiPop.
//!
//! The crate reads market and vendor listings from a hosted document store and drives the
//! vendor application workflow that writes new applications back to it. HTTP handlers for
//! both live next to their domain modules; the `hipop-api` service composes them.

pub mod config;
pub mod error;
pub mod listings;
pub mod store;
pub mod telemetry;
pub mod workflows;
