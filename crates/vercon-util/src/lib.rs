//! Shared utilities for vercon.
//!
//! This crate provides the cross-cutting error type used by all other vercon
//! crates.

pub mod errors;
