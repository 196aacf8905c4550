// SPDX-License-Identifier: MPL-2.0

//! Proptest strategies for versions and ranges.

use proptest::prelude::*;

use crate::{Comparator, Operator, Range, SemanticVersion};

/// Versions whose minor and patch components stay below 1000.
pub fn version_strategy() -> impl Strategy<Value = SemanticVersion> {
    (0u64..1000, 0u64..1000, 0u64..1000).prop_map(SemanticVersion::from)
}

/// A strategy for using ranges in proptests.
///
/// Generate ranges from a random vector of deltas between bounds. Each bound is randomly
/// inclusive or exclusive, and every bounded interval becomes its own clause-group.
/// Sometimes an empty clause-group is slipped in between them.
pub fn proptest_strategy() -> impl Strategy<Value = Range> {
    (
        any::<bool>(),
        prop::collection::vec((0u32..5_000, any::<bool>()), 1..10),
        prop::option::weighted(0.2, any::<prop::sample::Index>()),
    )
        .prop_map(|(start_unbounded, deltas, empty_group)| {
            let mut groups = to_clause_groups(start_unbounded, deltas);
            if let Some(index) = empty_group {
                groups.insert(index.index(groups.len() + 1), Vec::new());
            }
            Range::from_clause_groups(groups)
        })
}

/// Spread a flat position over the three version components.
fn position_to_version(position: u64) -> SemanticVersion {
    SemanticVersion::new(position / 1_000_000, (position / 1_000) % 1_000, position % 1_000)
}

fn to_clause_groups(start_unbounded: bool, deltas: Vec<(u32, bool)>) -> Vec<Vec<Comparator>> {
    let mut start = if start_unbounded {
        Some(None)
    } else {
        None
    };
    let mut largest: u64 = 0;
    let mut groups: Vec<Vec<Comparator>> = Vec::new();
    for (delta, inclusive) in deltas {
        largest += u64::from(delta);
        let version = position_to_version(largest);

        // If we already have a start bound, the next offset closes the interval.
        // If we don't have a start bound, we open one.
        if let Some(start_bound) = start.take() {
            let upper = if inclusive {
                Comparator::new(Operator::Le, version)
            } else {
                Comparator::new(Operator::Lt, version)
            };
            groups.push(match start_bound {
                Some(lower) => vec![lower, upper],
                None => vec![upper],
            });
        } else {
            let lower = if inclusive {
                Comparator::new(Operator::Ge, version)
            } else {
                Comparator::new(Operator::Gt, version)
            };
            start = Some(Some(lower));
        }
    }

    // An interval that was opened but never closed has no upper bound.
    match start {
        Some(Some(lower)) => groups.push(vec![lower]),
        Some(None) => groups.push(vec![Comparator::new(Operator::Ge, SemanticVersion::zero())]),
        None => {}
    }

    groups
}
