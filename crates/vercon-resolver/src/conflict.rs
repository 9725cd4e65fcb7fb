//! Conflict explanation: why a package's accumulated range is unusable.
//!
//! The explainer produces a structured [`Diagnostic`]; turning it into text is
//! left to [`crate::report`] or to the caller.
//!
//! Empty intersections are explained pairwise only: a group of ranges that
//! overlap two at a time yet share no common version would be reported with
//! no pairs, and the caller would only learn that the range is unsatisfiable.
//! Half-open intervals on a line cannot form such a group, so with
//! [`VersionRange`] some disjoint pair always exists; the search is not
//! generalised beyond pairs.

use std::collections::BTreeSet;

use serde::Serialize;
use vercon_util::errors::VerconError;

use crate::graph::ReverseDepends;
use crate::provenance::ProvenanceRange;
use crate::referrers::minimal_referrers;
use crate::version::{ExtendedRange, Version, VersionId, VersionRange};

/// An asserted range and the referrers responsible for it, de-duplicated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Blame {
    pub range: VersionRange,
    pub referrers: Vec<VersionId>,
}

/// A range and every later range it shares no version with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisjointGroup {
    pub blame: Blame,
    pub conflicts_with: Vec<Blame>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Problem {
    /// Nothing to report.
    Consistent,
    /// The asserted ranges have no version in common.
    NoCommonVersion { groups: Vec<DisjointGroup> },
    /// The candidate version lies outside the asserted ranges.
    Rejected {
        candidate: Version,
        excluded_by: Vec<Blame>,
    },
}

/// The explanation for one package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub package: String,
    pub problem: Problem,
}

impl Diagnostic {
    pub fn consistent(package: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            problem: Problem::Consistent,
        }
    }

    /// True when there are no entries to show.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of top-level entries.
    pub fn len(&self) -> usize {
        match &self.problem {
            Problem::Consistent => 0,
            Problem::NoCommonVersion { groups } => groups.len(),
            Problem::Rejected { excluded_by, .. } => excluded_by.len(),
        }
    }

    /// False whenever the range was unsatisfiable or the candidate rejected,
    /// even if no pairwise explanation was found.
    pub fn is_consistent(&self) -> bool {
        matches!(self.problem, Problem::Consistent)
    }
}

/// Explain why `range` cannot accept `candidate` (or any version, when the
/// range is unsatisfiable).
///
/// Every referrer recorded in `range` must be present in `reverse`; a missing
/// one is reported as an internal error.
pub fn explain(
    reverse: &ReverseDepends,
    package: &str,
    candidate: Option<Version>,
    range: &ProvenanceRange,
) -> Result<Diagnostic, VerconError> {
    let problem = match range.current() {
        ExtendedRange::Unconstrained => Problem::Consistent,
        ExtendedRange::Unsatisfiable => Problem::NoCommonVersion {
            groups: disjoint_groups(reverse, package, range)?,
        },
        ExtendedRange::Constrained(current) => match candidate {
            Some(version) if !current.contains(&version) => Problem::Rejected {
                candidate: version,
                excluded_by: excluding_ranges(reverse, package, version, range)?,
            },
            _ => Problem::Consistent,
        },
    };
    let diagnostic = Diagnostic {
        package: package.to_string(),
        problem,
    };
    tracing::debug!("explained {package}: {} entries", diagnostic.len());
    Ok(diagnostic)
}

fn blame(
    reverse: &ReverseDepends,
    range: &VersionRange,
    referrers: &BTreeSet<VersionId>,
) -> Result<Blame, VerconError> {
    Ok(Blame {
        range: *range,
        referrers: minimal_referrers(reverse, referrers)?,
    })
}

/// Pairs `a < b` of contributed ranges with an empty intersection, grouped
/// by `a`.
fn disjoint_groups(
    reverse: &ReverseDepends,
    package: &str,
    range: &ProvenanceRange,
) -> Result<Vec<DisjointGroup>, VerconError> {
    let contributions: Vec<_> = range.contributions().iter().collect();
    let mut groups = Vec::new();

    for (i, &(a, a_referrers)) in contributions.iter().enumerate() {
        let conflicts_with = contributions[i + 1..]
            .iter()
            .filter(|(b, _)| a.is_disjoint(b))
            .map(|&(b, b_referrers)| blame(reverse, b, b_referrers))
            .collect::<Result<Vec<_>, _>>()?;
        if conflicts_with.is_empty() {
            continue;
        }
        groups.push(DisjointGroup {
            blame: blame(reverse, a, a_referrers)?,
            conflicts_with,
        });
    }

    if groups.is_empty() {
        tracing::warn!(
            "no two requirements on {package} are disjoint; \
             {} ranges conflict only as a group",
            contributions.len()
        );
    }
    Ok(groups)
}

/// Contributed ranges that do not contain `candidate`.
fn excluding_ranges(
    reverse: &ReverseDepends,
    package: &str,
    candidate: Version,
    range: &ProvenanceRange,
) -> Result<Vec<Blame>, VerconError> {
    let excluded_by = range
        .contributions()
        .iter()
        .filter(|(r, _)| !r.contains(&candidate))
        .map(|(r, referrers)| blame(reverse, r, referrers))
        .collect::<Result<Vec<_>, _>>()?;
    if excluded_by.is_empty() {
        return Err(VerconError::internal(
            301,
            format!(
                "{package} {candidate} is outside {} but no requirement excludes it",
                range.current()
            ),
        ));
    }
    Ok(excluded_by)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(text: &str) -> Version {
        Version::parse(text).unwrap()
    }

    fn id(name: &str) -> VersionId {
        VersionId::new(name, v("1.0.0"))
    }

    fn r(text: &str) -> VersionRange {
        VersionRange::parse(text).unwrap()
    }

    /// root -> x, root -> y, root -> z; all referrers at depth 1.
    fn flat() -> ReverseDepends {
        let mut t = ReverseDepends::new();
        t.insert(id("root"), 0, BTreeSet::new());
        for name in ["x", "y", "z"] {
            t.insert(id(name), 1, BTreeSet::from([id("root")]));
        }
        t
    }

    #[test]
    fn unconstrained_is_consistent() {
        let d = explain(&flat(), "lib", Some(v("9.0.0")), &ProvenanceRange::empty()).unwrap();
        assert!(d.is_empty());
        assert!(d.is_consistent());
    }

    #[test]
    fn constrained_without_candidate_is_consistent() {
        let range = ProvenanceRange::empty().fold(id("x"), r("[1.0.0,2.0.0)"));
        let d = explain(&flat(), "lib", None, &range).unwrap();
        assert!(d.is_consistent());
    }

    #[test]
    fn candidate_inside_is_consistent() {
        let range = ProvenanceRange::empty().fold(id("x"), r("[1.0.0,2.0.0)"));
        let d = explain(&flat(), "lib", Some(v("1.9.9")), &range).unwrap();
        assert!(d.is_consistent());
        assert!(d.is_empty());
    }

    #[test]
    fn rejected_candidate_names_the_excluding_range() {
        let range = ProvenanceRange::empty().fold(id("x"), r("[1.0.0,2.0.0)"));
        let d = explain(&flat(), "lib", Some(v("2.5.0")), &range).unwrap();
        assert_eq!(
            d.problem,
            Problem::Rejected {
                candidate: v("2.5.0"),
                excluded_by: vec![Blame {
                    range: r("[1.0.0,2.0.0)"),
                    referrers: vec![id("x")],
                }],
            }
        );
        assert_eq!(d.len(), 1);
    }

    #[test]
    fn rejected_candidate_skips_ranges_that_admit_it() {
        let range = ProvenanceRange::from_edges([
            (id("x"), r("[1.0.0,3.0.0)")),
            (id("y"), r("[1.5.0,2.0.0)")),
            (id("z"), r("[0.5.0,2.0.0)")),
        ]);
        let d = explain(&flat(), "lib", Some(v("2.5.0")), &range).unwrap();
        let Problem::Rejected { excluded_by, .. } = d.problem else {
            panic!("expected a rejection, got {:?}", d.problem);
        };
        let ranges: Vec<VersionRange> = excluded_by.iter().map(|b| b.range).collect();
        assert_eq!(ranges, vec![r("[0.5.0,2.0.0)"), r("[1.5.0,2.0.0)")]);
    }

    #[test]
    fn disjoint_pair_is_reported_once() {
        let range = ProvenanceRange::from_edges([
            (id("y"), r("[2.0.0,3.0.0)")),
            (id("x"), r("[1.0.0,2.0.0)")),
        ]);
        assert_eq!(*range.current(), ExtendedRange::Unsatisfiable);
        let d = explain(&flat(), "lib", None, &range).unwrap();
        assert_eq!(
            d.problem,
            Problem::NoCommonVersion {
                groups: vec![DisjointGroup {
                    blame: Blame {
                        range: r("[1.0.0,2.0.0)"),
                        referrers: vec![id("x")],
                    },
                    conflicts_with: vec![Blame {
                        range: r("[2.0.0,3.0.0)"),
                        referrers: vec![id("y")],
                    }],
                }],
            }
        );
    }

    #[test]
    fn disjoint_groups_by_lower_range() {
        let range = ProvenanceRange::from_edges([
            (id("x"), r("[1.0.0,2.0.0)")),
            (id("y"), r("[3.0.0,4.0.0)")),
            (id("z"), r("[1.5.0,3.5.0)")),
        ]);
        let d = explain(&flat(), "lib", Some(v("1.0.0")), &range).unwrap();
        let Problem::NoCommonVersion { groups } = &d.problem else {
            panic!("expected disjoint ranges, got {:?}", d.problem);
        };
        // [1,2) conflicts with [3,4); [1.5,3.5) overlaps both.
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].blame.range, r("[1.0.0,2.0.0)"));
        assert_eq!(groups[0].conflicts_with.len(), 1);
        assert_eq!(groups[0].conflicts_with[0].range, r("[3.0.0,4.0.0)"));
    }

    #[test]
    fn overlapping_chain_still_yields_a_disjoint_pair() {
        let range = ProvenanceRange::from_edges([
            (id("x"), r("[1.0.0,2.0.0)")),
            (id("y"), r("[1.5.0,3.0.0)")),
            (id("z"), r("[1.0.0,1.6.0)")),
            (id("z"), r("[1.9.0,3.0.0)")),
        ]);
        assert_eq!(*range.current(), ExtendedRange::Unsatisfiable);
        let d = explain(&flat(), "lib", None, &range).unwrap();
        let Problem::NoCommonVersion { groups } = &d.problem else {
            panic!("expected disjoint ranges, got {:?}", d.problem);
        };
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].blame.range, r("[1.0.0,1.6.0)"));
        assert_eq!(groups[0].conflicts_with[0].range, r("[1.9.0,3.0.0)"));
    }

    #[test]
    fn shared_range_lists_minimal_referrers() {
        // root -> x -> y; both require the same range.
        let mut t = ReverseDepends::new();
        t.insert(id("root"), 0, BTreeSet::new());
        t.insert(id("x"), 1, BTreeSet::from([id("root")]));
        t.insert(id("y"), 2, BTreeSet::from([id("x")]));
        let range = ProvenanceRange::from_edges([
            (id("y"), r("[1.0.0,2.0.0)")),
            (id("x"), r("[1.0.0,2.0.0)")),
        ]);
        let d = explain(&t, "lib", Some(v("3.0.0")), &range).unwrap();
        let Problem::Rejected { excluded_by, .. } = d.problem else {
            panic!("expected a rejection");
        };
        assert_eq!(excluded_by[0].referrers, vec![id("x")]);
    }

    #[test]
    fn disjoint_sides_list_minimal_referrers() {
        // root -> x -> y, root -> z; x and y share one side of the conflict.
        let mut t = ReverseDepends::new();
        t.insert(id("root"), 0, BTreeSet::new());
        t.insert(id("x"), 1, BTreeSet::from([id("root")]));
        t.insert(id("z"), 1, BTreeSet::from([id("root")]));
        t.insert(id("y"), 2, BTreeSet::from([id("x")]));
        let range = ProvenanceRange::from_edges([
            (id("y"), r("[1.0.0,2.0.0)")),
            (id("z"), r("[2.0.0,3.0.0)")),
            (id("x"), r("[1.0.0,2.0.0)")),
        ]);
        let d = explain(&t, "lib", None, &range).unwrap();
        let Problem::NoCommonVersion { groups } = d.problem else {
            panic!("expected disjoint ranges, got {:?}", d.problem);
        };
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].blame.range, r("[1.0.0,2.0.0)"));
        assert_eq!(groups[0].blame.referrers, vec![id("x")]);
        assert_eq!(groups[0].conflicts_with[0].referrers, vec![id("z")]);
    }

    #[test]
    fn unknown_referrer_is_internal_error() {
        let range = ProvenanceRange::empty().fold(id("ghost"), r("[1.0.0,2.0.0)"));
        let err = explain(&flat(), "lib", Some(v("3.0.0")), &range).unwrap_err();
        assert!(err.internal_tag().is_some());
        assert!(err.to_string().contains("ghost 1.0.0"));
    }
}
