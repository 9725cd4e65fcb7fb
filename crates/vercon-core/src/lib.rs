//! Core data types for vercon.
//!
//! This crate defines the plain data the constraint engine is driven by:
//! global configuration and scenario files that describe a dependency graph
//! as a resolver driver would see it.
//!
//! This crate is intentionally free of resolution logic; version and range
//! text is kept as strings and parsed by `vercon-resolver`.

pub mod config;
pub mod scenario;
