//! Versions, package-version identities, and half-open version ranges.
//!
//! A [`VersionRange`] is the interval `min <= v < max`. Intersecting ranges
//! that may cancel out is expressed with [`ExtendedRange`], which adds the
//! "no constraint yet" and "nothing satisfies this" states to a plain range.

use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};
use vercon_util::errors::VerconError;

/// A `major.minor.patch` version. Ordering is lexicographic on the triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Version {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
}

impl Version {
    pub const fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Parse `1.2.3`. Pre-release and build metadata are rejected.
    pub fn parse(text: &str) -> Result<Self, VerconError> {
        let parsed = semver::Version::parse(text.trim()).map_err(|e| VerconError::Version {
            message: format!("`{text}`: {e}"),
        })?;
        if !parsed.pre.is_empty() || !parsed.build.is_empty() {
            return Err(VerconError::Version {
                message: format!("`{text}`: pre-release and build metadata are not supported"),
            });
        }
        Ok(Self::new(parsed.major, parsed.minor, parsed.patch))
    }

    /// The smallest version greater than this one.
    ///
    /// A patch at `u64::MAX` rolls over into the minor, and a minor at
    /// `u64::MAX` into the major. Fails only for `MAX.MAX.MAX`.
    pub fn successor(&self) -> Result<Self, VerconError> {
        if let Some(patch) = self.patch.checked_add(1) {
            return Ok(Self::new(self.major, self.minor, patch));
        }
        if let Some(minor) = self.minor.checked_add(1) {
            return Ok(Self::new(self.major, minor, 0));
        }
        match self.major.checked_add(1) {
            Some(major) => Ok(Self::new(major, 0, 0)),
            None => Err(VerconError::Version {
                message: format!("{self} has no successor"),
            }),
        }
    }
}

impl FromStr for Version {
    type Err = VerconError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

impl Serialize for Version {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Identity of a node in the dependency graph: one version of one package.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct VersionId {
    pub name: String,
    pub version: Version,
}

impl VersionId {
    pub fn new(name: impl Into<String>, version: Version) -> Self {
        Self {
            name: name.into(),
            version,
        }
    }
}

impl fmt::Display for VersionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.name, self.version)
    }
}

/// The half-open interval `min <= v < max`.
///
/// `min == max` is allowed: such a range matches nothing but still records
/// who asserted it. Ordering is lexicographic on `(min, max)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct VersionRange {
    min: Version,
    max: Version,
}

impl VersionRange {
    pub fn new(min: Version, max: Version) -> Result<Self, VerconError> {
        if min > max {
            return Err(VerconError::Version {
                message: format!("range lower bound {min} is above upper bound {max}"),
            });
        }
        Ok(Self { min, max })
    }

    /// The range matching exactly `version`.
    pub fn exact(version: Version) -> Result<Self, VerconError> {
        Ok(Self {
            min: version,
            max: version.successor()?,
        })
    }

    /// Parse a range expression.
    ///
    /// Supports: `[1.0.0,2.0.0)`, `1.0.0 <= v < 2.0.0`, `[1.2.3]` (exact).
    pub fn parse(spec: &str) -> Result<Self, VerconError> {
        let s = spec.trim();
        let invalid = || VerconError::Version {
            message: format!("`{spec}` is not a version range"),
        };

        if let Some(inner) = s.strip_prefix('[') {
            if let Some(inner) = inner.strip_suffix(')') {
                let (lower, upper) = inner.split_once(',').ok_or_else(invalid)?;
                return Self::new(Version::parse(lower)?, Version::parse(upper)?);
            }
            if let Some(inner) = inner.strip_suffix(']') {
                if inner.contains(',') {
                    return Err(invalid());
                }
                return Self::exact(Version::parse(inner)?);
            }
            return Err(invalid());
        }

        let (lower, rest) = s.split_once("<=").ok_or_else(invalid)?;
        let (var, upper) = rest.split_once('<').ok_or_else(invalid)?;
        if var.trim() != "v" {
            return Err(invalid());
        }
        Self::new(Version::parse(lower)?, Version::parse(upper)?)
    }

    pub fn min(&self) -> Version {
        self.min
    }

    pub fn max(&self) -> Version {
        self.max
    }

    /// True when no version satisfies the range.
    pub fn is_empty(&self) -> bool {
        self.min == self.max
    }

    pub fn contains(&self, version: &Version) -> bool {
        self.min <= *version && *version < self.max
    }

    /// The overlap of two ranges, or `None` when they share no version.
    pub fn intersect(&self, other: &VersionRange) -> Option<VersionRange> {
        let min = self.min.max(other.min);
        let max = self.max.min(other.max);
        (min < max).then_some(VersionRange { min, max })
    }

    pub fn is_disjoint(&self, other: &VersionRange) -> bool {
        self.intersect(other).is_none()
    }
}

impl FromStr for VersionRange {
    type Err = VerconError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for VersionRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} <= v < {}", self.min, self.max)
    }
}

/// The result of intersecting zero or more version ranges.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "state", content = "range", rename_all = "snake_case")]
pub enum ExtendedRange {
    /// Nothing has been asserted yet; every version matches.
    #[default]
    Unconstrained,
    Constrained(VersionRange),
    /// The asserted ranges share no version.
    Unsatisfiable,
}

impl ExtendedRange {
    pub fn intersect(&self, other: &ExtendedRange) -> ExtendedRange {
        match (self, other) {
            (ExtendedRange::Unsatisfiable, _) | (_, ExtendedRange::Unsatisfiable) => {
                ExtendedRange::Unsatisfiable
            }
            (ExtendedRange::Unconstrained, r) | (r, ExtendedRange::Unconstrained) => *r,
            (ExtendedRange::Constrained(a), ExtendedRange::Constrained(b)) => match a.intersect(b)
            {
                Some(overlap) => ExtendedRange::Constrained(overlap),
                None => ExtendedRange::Unsatisfiable,
            },
        }
    }

    pub fn contains(&self, version: &Version) -> bool {
        match self {
            ExtendedRange::Unconstrained => true,
            ExtendedRange::Constrained(range) => range.contains(version),
            ExtendedRange::Unsatisfiable => false,
        }
    }
}

impl From<VersionRange> for ExtendedRange {
    fn from(range: VersionRange) -> Self {
        ExtendedRange::Constrained(range)
    }
}

impl fmt::Display for ExtendedRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtendedRange::Unconstrained => f.write_str("any version"),
            ExtendedRange::Constrained(range) => write!(f, "{range}"),
            ExtendedRange::Unsatisfiable => f.write_str("no version"),
        }
    }
}
