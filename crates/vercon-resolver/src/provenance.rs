//! Range accumulation that remembers which referrer asserted which range.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::version::{ExtendedRange, Version, VersionId, VersionRange};

/// The intersection of every range imposed on one package, together with the
/// referrers behind each distinct range.
///
/// Referrers asserting the identical range share one entry, so a constraint
/// repeated by many dependents is explained once.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProvenanceRange {
    current: ExtendedRange,
    contributions: BTreeMap<VersionRange, BTreeSet<VersionId>>,
}

impl ProvenanceRange {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Narrow by `range`, recorded as asserted by `referrer`.
    ///
    /// `current` stays the intersection of the distinct ranges: repeating a
    /// range only adds a referrer. This matters for empty ranges, which do not
    /// intersect with themselves.
    pub fn fold(mut self, referrer: VersionId, range: VersionRange) -> Self {
        let referrers = self.contributions.entry(range).or_default();
        if referrers.is_empty() {
            self.current = self.current.intersect(&ExtendedRange::Constrained(range));
            tracing::debug!("{referrer} requires {range}: now {}", self.current);
        }
        referrers.insert(referrer);
        self
    }

    /// Fold `edges` in order, starting from [`ProvenanceRange::empty`].
    pub fn from_edges<I>(edges: I) -> Self
    where
        I: IntoIterator<Item = (VersionId, VersionRange)>,
    {
        edges
            .into_iter()
            .fold(Self::empty(), |acc, (referrer, range)| acc.fold(referrer, range))
    }

    pub fn contains(&self, version: &Version) -> bool {
        self.current.contains(version)
    }

    pub fn current(&self) -> &ExtendedRange {
        &self.current
    }

    /// Each distinct asserted range and the referrers that asserted it.
    pub fn contributions(&self) -> &BTreeMap<VersionRange, BTreeSet<VersionId>> {
        &self.contributions
    }

    /// Every referrer that asserted any range.
    pub fn referrers(&self) -> BTreeSet<&VersionId> {
        self.contributions.values().flatten().collect()
    }
}

impl FromIterator<(VersionId, VersionRange)> for ProvenanceRange {
    fn from_iter<I: IntoIterator<Item = (VersionId, VersionRange)>>(iter: I) -> Self {
        Self::from_edges(iter)
    }
}
