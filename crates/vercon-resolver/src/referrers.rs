//! Referrer de-duplication by ancestor dominance.
//!
//! When several referrers share responsibility for a range, reporting all of
//! them is mostly noise: if `a` is already listed and `b` is only reachable
//! through `a`, naming `b` adds nothing. Referrers are visited shallowest
//! first; a referrer is dropped when every one of its immediate parents has
//! already been visited, or is itself a dropped member of the same set.
//! Dropped referrers still count as visited, so they can dominate deeper ones.

use std::collections::{BTreeSet, HashMap, HashSet};

use vercon_util::errors::VerconError;

use crate::graph::ReverseDepends;
use crate::version::VersionId;

#[derive(Debug, Clone, Copy)]
enum Mark {
    Visiting,
    Done(bool),
}

enum Frame<'a> {
    Enter(&'a VersionId),
    Exit(&'a VersionId),
}

/// Reduce `referrers` to the ones that carry information, ordered by depth
/// from the root and then by identity.
///
/// Fails with an internal error when a referrer is missing from `reverse` or
/// the referrers' parent links form a cycle.
pub fn minimal_referrers<'a, I>(
    reverse: &'a ReverseDepends,
    referrers: I,
) -> Result<Vec<VersionId>, VerconError>
where
    I: IntoIterator<Item = &'a VersionId>,
{
    let candidates: BTreeSet<&VersionId> = referrers.into_iter().collect();

    let mut ordered = candidates
        .iter()
        .map(|&id| reverse.lookup(id, 201).map(|entry| (entry.depth, id)))
        .collect::<Result<Vec<_>, _>>()?;
    ordered.sort();

    let mut seen: HashSet<&VersionId> = HashSet::new();
    let mut survivors = Vec::new();
    for (depth, id) in ordered {
        let dominated = is_dominated(reverse, &candidates, &seen, id)?;
        tracing::trace!("{id} at depth {depth}: dominated = {dominated}");
        if !dominated {
            survivors.push(id.clone());
        }
        seen.insert(id);
    }

    if survivors.is_empty() && !candidates.is_empty() {
        return Err(VerconError::internal(
            205,
            format!("all {} referrers were dominated", candidates.len()),
        ));
    }
    Ok(survivors)
}

/// `start` is dominated when it has a parent and every parent is in `seen`
/// or is a dominated member of `candidates`.
///
/// Walks candidate parents with an explicit stack; verdicts are memoized so
/// shared ancestors are evaluated once.
fn is_dominated<'a>(
    reverse: &'a ReverseDepends,
    candidates: &BTreeSet<&'a VersionId>,
    seen: &HashSet<&'a VersionId>,
    start: &'a VersionId,
) -> Result<bool, VerconError> {
    let mut marks: HashMap<&VersionId, Mark> = HashMap::new();
    let mut stack = vec![Frame::Enter(start)];

    while let Some(frame) = stack.pop() {
        match frame {
            Frame::Enter(id) => {
                if marks.contains_key(id) {
                    continue;
                }
                let parents = &reverse.lookup(id, 202)?.parents;
                let open = parents
                    .iter()
                    .any(|p| !seen.contains(p) && !candidates.contains(p));
                if parents.is_empty() || open {
                    marks.insert(id, Mark::Done(false));
                    continue;
                }

                marks.insert(id, Mark::Visiting);
                stack.push(Frame::Exit(id));
                for parent in parents.iter().filter(|p| !seen.contains(*p)) {
                    match marks.get(parent) {
                        Some(Mark::Visiting) => {
                            return Err(VerconError::internal(
                                203,
                                format!("dependency cycle through {parent} and {id}"),
                            ));
                        }
                        Some(Mark::Done(_)) => {}
                        None => stack.push(Frame::Enter(parent)),
                    }
                }
            }
            Frame::Exit(id) => {
                let parents = &reverse.lookup(id, 202)?.parents;
                let dominated = parents
                    .iter()
                    .all(|p| seen.contains(p) || matches!(marks.get(p), Some(Mark::Done(true))));
                marks.insert(id, Mark::Done(dominated));
            }
        }
    }

    match marks.get(start) {
        Some(Mark::Done(dominated)) => Ok(*dominated),
        _ => Err(VerconError::internal(
            204,
            format!("no dominance verdict for {start}"),
        )),
    }
}
