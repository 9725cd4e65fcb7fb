//! Scenario files: a TOML description of one resolution attempt.
//!
//! A scenario lists the package-version nodes currently in the graph (at most
//! one version per package), the requirements each node places on other
//! packages, and optionally a lock table and the versions a registry offers.
//!
//! ```toml
//! root = "app"
//!
//! [[node]]
//! name = "app"
//! version = "1.0.0"
//! requires = [
//!     { package = "http", range = "[1.0.0,2.0.0)" },
//!     { package = "check", range = "[0.3.0,0.4.0)", test = true },
//! ]
//!
//! [lock]
//! http = "1.4.0"
//!
//! [available]
//! http = ["1.4.0", "2.0.0"]
//! ```

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use vercon_util::errors::{VerconError, VerconResult};

/// A parsed scenario file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    /// Package name of the resolution root.
    pub root: String,

    #[serde(default, rename = "node")]
    pub nodes: Vec<NodeEntry>,

    /// Versions recorded by a previous lock file.
    #[serde(default)]
    pub lock: BTreeMap<String, String>,

    /// Versions the registry can serve, per package. Packages without an
    /// entry are assumed to have every version available.
    #[serde(default)]
    pub available: BTreeMap<String, Vec<String>>,
}

/// One package-version in the graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeEntry {
    pub name: String,
    pub version: String,
    #[serde(default)]
    pub requires: Vec<Requirement>,
}

/// A version range a node imposes on another package.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Requirement {
    pub package: String,
    pub range: String,
    /// Only needed for the node's tests.
    #[serde(default)]
    pub test: bool,
}

impl Scenario {
    /// Load and parse a scenario from the given path.
    pub fn from_path(path: &Path) -> VerconResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| VerconError::Scenario {
            message: format!("Failed to read {}: {e}", path.display()),
        })?;
        Self::parse_toml(&content).map_err(Into::into)
    }

    /// Parse and validate a scenario from TOML text.
    pub fn parse_toml(content: &str) -> Result<Self, VerconError> {
        let scenario: Scenario = toml::from_str(content).map_err(|e| VerconError::Scenario {
            message: format!("Failed to parse scenario: {e}"),
        })?;
        scenario.validate()?;
        Ok(scenario)
    }

    fn validate(&self) -> Result<(), VerconError> {
        let mut names = BTreeSet::new();
        for node in &self.nodes {
            if !names.insert(node.name.as_str()) {
                return Err(VerconError::Scenario {
                    message: format!("package `{}` has more than one node", node.name),
                });
            }
        }
        if !names.contains(self.root.as_str()) {
            return Err(VerconError::Scenario {
                message: format!("root package `{}` has no node", self.root),
            });
        }
        Ok(())
    }

    /// The node for a package, if one was chosen.
    pub fn node(&self, name: &str) -> Option<&NodeEntry> {
        self.nodes.iter().find(|n| n.name == name)
    }

    /// Every package that is a node or is required by one, sorted by name.
    pub fn packages(&self) -> BTreeSet<&str> {
        let mut out: BTreeSet<&str> = self.nodes.iter().map(|n| n.name.as_str()).collect();
        for node in &self.nodes {
            out.extend(node.requires.iter().map(|r| r.package.as_str()));
        }
        out
    }

    /// Whether the scenario mentions `package` at all.
    pub fn knows(&self, package: &str) -> bool {
        self.node(package).is_some()
            || self
                .nodes
                .iter()
                .any(|n| n.requires.iter().any(|r| r.package == package))
    }

    /// Whether the registry can serve `version` of `package`.
    pub fn is_available(&self, package: &str, version: &str) -> bool {
        match self.available.get(package) {
            Some(versions) => versions.iter().any(|v| v == version),
            None => true,
        }
    }
}
