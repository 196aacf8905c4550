// SPDX-License-Identifier: MPL-2.0

//! Semantic versions and node-style version ranges.
//!
//! A [Range] is kept in the shape package registries hand it out: a disjunction
//! of clause-groups, each clause-group a conjunction of [Comparator]s. Shorthands
//! such as `^1.2.3`, `~1.2`, `1.x` or `1.2.3 - 2.0.0` are expanded while parsing,
//! so consumers only ever see primitive `(operator, version)` pairs.
//!
//! ```
//! use semver_ranges::{Operator, Range, SemanticVersion};
//!
//! let range: Range = ">=1.2.7 <1.3.0 || ^2".parse().unwrap();
//! assert_eq!(range.clause_groups().len(), 2);
//! assert_eq!(range.clause_groups()[1][0].operator, Operator::Ge);
//! assert!(range.satisfies(&SemanticVersion::new(2, 4, 0)));
//! ```

#![warn(missing_docs)]

mod range;
mod version;

pub use range::{ClauseGroup, Comparator, Operator, Range, RangeParseError};
pub use version::{SemanticVersion, VersionParseError};

#[cfg(any(feature = "proptest", test))]
pub mod testing;
