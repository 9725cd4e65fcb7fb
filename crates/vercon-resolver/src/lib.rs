//! Version-constraint engine: accumulates the ranges referrers impose on a
//! package while remembering who asserted what, and explains the result when
//! the ranges cancel out or a chosen version falls outside them.
//!
//! The engine is pure and synchronous. The dependency graph and its reverse
//! lookup are built by the driver (see [`graph`]) and only read here.

pub mod conflict;
pub mod graph;
pub mod provenance;
pub mod referrers;
pub mod report;
pub mod state;
pub mod version;
