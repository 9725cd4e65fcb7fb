//! Per-package bookkeeping during one resolution attempt.

use serde::Serialize;
use vercon_util::errors::VerconError;

use crate::provenance::ProvenanceRange;
use crate::version::{Version, VersionId, VersionRange};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DependencyKind {
    Normal,
    /// Only required by tests.
    Test,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Directness {
    /// Required by the root itself.
    Direct,
    Indirect,
}

/// A package either still collecting constraints or pinned to a version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PackageState {
    Unsolved {
        kind: DependencyKind,
        directness: Directness,
        locked: Option<Version>,
        constraint: ProvenanceRange,
    },
    Solved {
        kind: DependencyKind,
        directness: Directness,
        version: Version,
        matches_lock: bool,
    },
}

impl PackageState {
    pub fn unsolved(kind: DependencyKind, directness: Directness, locked: Option<Version>) -> Self {
        PackageState::Unsolved {
            kind,
            directness,
            locked,
            constraint: ProvenanceRange::empty(),
        }
    }

    /// Fold another referrer's range into an unsolved package.
    pub fn constrain(self, referrer: VersionId, range: VersionRange) -> Result<Self, VerconError> {
        match self {
            PackageState::Unsolved {
                kind,
                directness,
                locked,
                constraint,
            } => Ok(PackageState::Unsolved {
                kind,
                directness,
                locked,
                constraint: constraint.fold(referrer, range),
            }),
            PackageState::Solved { version, .. } => Err(VerconError::internal(
                401,
                format!("{referrer} constrains a package already solved at {version}"),
            )),
        }
    }

    /// Pin the package to `version` if its constraint admits it.
    ///
    /// Returns `Ok(None)` when the version is outside the constraint; the
    /// caller explains why with [`crate::conflict::explain`].
    pub fn solve(&self, version: Version) -> Result<Option<PackageState>, VerconError> {
        match self {
            PackageState::Unsolved {
                kind,
                directness,
                locked,
                constraint,
            } => {
                if !constraint.contains(&version) {
                    return Ok(None);
                }
                Ok(Some(PackageState::Solved {
                    kind: *kind,
                    directness: *directness,
                    version,
                    matches_lock: *locked == Some(version),
                }))
            }
            PackageState::Solved { version: solved, .. } => Err(VerconError::internal(
                402,
                format!("package already solved at {solved}, asked to solve at {version}"),
            )),
        }
    }

    pub fn kind(&self) -> DependencyKind {
        match self {
            PackageState::Unsolved { kind, .. } | PackageState::Solved { kind, .. } => *kind,
        }
    }

    pub fn directness(&self) -> Directness {
        match self {
            PackageState::Unsolved { directness, .. } | PackageState::Solved { directness, .. } => {
                *directness
            }
        }
    }

    /// The accumulated constraint, while unsolved.
    pub fn constraint(&self) -> Option<&ProvenanceRange> {
        match self {
            PackageState::Unsolved { constraint, .. } => Some(constraint),
            PackageState::Solved { .. } => None,
        }
    }

    pub fn version(&self) -> Option<Version> {
        match self {
            PackageState::Solved { version, .. } => Some(*version),
            PackageState::Unsolved { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::version::ExtendedRange;

    fn v(text: &str) -> Version {
        Version::parse(text).unwrap()
    }

    fn id(name: &str) -> VersionId {
        VersionId::new(name, v("1.0.0"))
    }

    fn r(text: &str) -> VersionRange {
        VersionRange::parse(text).unwrap()
    }

    #[test]
    fn constrain_accumulates() {
        let state = PackageState::unsolved(DependencyKind::Normal, Directness::Direct, None)
            .constrain(id("a"), r("[1.0.0,3.0.0)"))
            .unwrap()
            .constrain(id("b"), r("[2.0.0,4.0.0)"))
            .unwrap();
        assert_eq!(
            *state.constraint().unwrap().current(),
            ExtendedRange::Constrained(r("[2.0.0,3.0.0)"))
        );
        assert_eq!(state.version(), None);
    }

    #[test]
    fn solve_inside_range_records_lock_match() {
        let state =
            PackageState::unsolved(DependencyKind::Test, Directness::Indirect, Some(v("2.1.0")))
                .constrain(id("a"), r("[2.0.0,3.0.0)"))
                .unwrap();

        let solved = state.solve(v("2.1.0")).unwrap().unwrap();
        assert_eq!(
            solved,
            PackageState::Solved {
                kind: DependencyKind::Test,
                directness: Directness::Indirect,
                version: v("2.1.0"),
                matches_lock: true,
            }
        );
        assert_eq!(solved.version(), Some(v("2.1.0")));

        let other = state.solve(v("2.2.0")).unwrap().unwrap();
        assert!(matches!(other, PackageState::Solved { matches_lock: false, .. }));
    }

    #[test]
    fn solve_outside_range_is_none() {
        let state = PackageState::unsolved(DependencyKind::Normal, Directness::Direct, None)
            .constrain(id("a"), r("[1.0.0,2.0.0)"))
            .unwrap();
        assert_eq!(state.solve(v("2.0.0")).unwrap(), None);
    }

    #[test]
    fn solved_state_rejects_more_work() {
        let solved = PackageState::unsolved(DependencyKind::Normal, Directness::Direct, None)
            .solve(v("1.0.0"))
            .unwrap()
            .unwrap();
        assert_eq!(solved.constraint(), None);
        let err = solved.solve(v("1.0.0")).unwrap_err();
        assert_eq!(err.internal_tag(), Some(402));
        let err = solved.constrain(id("a"), r("[1.0.0,2.0.0)")).unwrap_err();
        assert_eq!(err.internal_tag(), Some(401));
    }
}
