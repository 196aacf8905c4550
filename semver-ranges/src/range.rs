// SPDX-License-Identifier: MPL-2.0

//! Ranges written in the node package manager flavour of semver.
//!
//! A range such as `^0.14.0 || >=15.0.0 <16` is a disjunction of clause-groups,
//! each clause-group being a conjunction of comparators. Parsing desugars the
//! shorthands (caret, tilde, x-ranges, hyphen ranges) into primitive comparators
//! so that every clause-group only holds `(operator, version)` pairs:
//!
//! ```
//! # use semver_ranges::Range;
//! let range: Range = "^0.14.0 || ^15.0.0".parse().unwrap();
//! assert_eq!(range.to_string(), ">=0.14.0 <0.15.0 || >=15.0.0 <16.0.0");
//! ```
//!
//! Prerelease tags never survive parsing. An exclusive upper bound such as
//! `<3.0.0-0`, which the caret shorthand produces, is kept as `<3.0.0`.

use std::fmt::{self, Display};
use std::str::FromStr;

use smallvec::{smallvec, SmallVec};
use thiserror::Error;

use crate::version::{release_part, SemanticVersion};

/// The comparison a [Comparator] performs, named after its syntax.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Operator {
    /// A bare version, `1.2.3`.
    Exact,
    /// `=`
    Eq,
    /// `==`
    LooseEq,
    /// `===`
    StrictEq,
    /// `!=`
    Ne,
    /// `!==`
    StrictNe,
    /// `>`
    Gt,
    /// `>=`
    Ge,
    /// `<`
    Lt,
    /// `<=`
    Le,
}

impl Operator {
    // Longest symbols first, prefix matching relies on it.
    const SYMBOLS: [(&'static str, Operator); 9] = [
        ("===", Operator::StrictEq),
        ("!==", Operator::StrictNe),
        ("==", Operator::LooseEq),
        ("!=", Operator::Ne),
        (">=", Operator::Ge),
        ("<=", Operator::Le),
        (">", Operator::Gt),
        ("<", Operator::Lt),
        ("=", Operator::Eq),
    ];

    /// The syntax of this operator. [Operator::Exact] has an empty symbol.
    pub fn symbol(self) -> &'static str {
        match self {
            Operator::Exact => "",
            Operator::Eq => "=",
            Operator::LooseEq => "==",
            Operator::StrictEq => "===",
            Operator::Ne => "!=",
            Operator::StrictNe => "!==",
            Operator::Gt => ">",
            Operator::Ge => ">=",
            Operator::Lt => "<",
            Operator::Le => "<=",
        }
    }

    /// The operator whose syntax is exactly `symbol`, if any.
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        if symbol.is_empty() {
            return Some(Operator::Exact);
        }
        Self::SYMBOLS
            .iter()
            .find(|(s, _)| *s == symbol)
            .map(|(_, op)| *op)
    }

    /// Split a leading operator off `token`, defaulting to [Operator::Exact].
    fn split_prefix(token: &str) -> (Self, &str) {
        Self::SYMBOLS
            .iter()
            .find_map(|(s, op)| token.strip_prefix(s).map(|rest| (*op, rest)))
            .unwrap_or((Operator::Exact, token))
    }

    fn compare(self, version: &SemanticVersion, bound: &SemanticVersion) -> bool {
        match self {
            Operator::Exact | Operator::Eq | Operator::LooseEq | Operator::StrictEq => {
                version == bound
            }
            Operator::Ne | Operator::StrictNe => version != bound,
            Operator::Gt => version > bound,
            Operator::Ge => version >= bound,
            Operator::Lt => version < bound,
            Operator::Le => version <= bound,
        }
    }
}

impl Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// A single `(operator, version)` pair, e.g. `>=2.0.0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Comparator {
    /// How candidates are compared to [Comparator::version].
    pub operator: Operator,
    /// The bound.
    pub version: SemanticVersion,
}

impl Comparator {
    /// Compare against `version` with `operator`.
    pub fn new(operator: Operator, version: impl Into<SemanticVersion>) -> Self {
        Self {
            operator,
            version: version.into(),
        }
    }

    /// Whether `version` passes this comparator.
    pub fn matches(&self, version: &SemanticVersion) -> bool {
        self.operator.compare(version, &self.version)
    }
}

impl Display for Comparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.operator, self.version)
    }
}

/// Comparators that must all hold. Most groups are a lower and an upper bound.
pub type ClauseGroup = SmallVec<[Comparator; 2]>;

/// A disjunction of [ClauseGroup]s.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Range {
    clause_groups: Vec<ClauseGroup>,
}

impl Range {
    /// The range matching every version, `>=0.0.0`.
    pub fn any() -> Self {
        Self {
            clause_groups: vec![any_version()],
        }
    }

    /// Build a range out of clause-groups, kept in the given order.
    pub fn from_clause_groups<G, C>(clause_groups: G) -> Self
    where
        G: IntoIterator<Item = C>,
        C: IntoIterator<Item = Comparator>,
    {
        Self {
            clause_groups: clause_groups
                .into_iter()
                .map(|group| group.into_iter().collect())
                .collect(),
        }
    }

    /// The alternatives of this range, in source order.
    pub fn clause_groups(&self) -> &[ClauseGroup] {
        &self.clause_groups
    }

    /// Whether at least one clause-group is entirely satisfied by `version`.
    pub fn satisfies(&self, version: &SemanticVersion) -> bool {
        self.clause_groups
            .iter()
            .any(|group| group.iter().all(|c| c.matches(version)))
    }

    /// Whether `range` is syntactically valid.
    pub fn is_valid(range: &str) -> bool {
        range.parse::<Range>().is_ok()
    }
}

impl Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, group) in self.clause_groups.iter().enumerate() {
            if i > 0 {
                f.write_str(" || ")?;
            }
            for (j, comparator) in group.iter().enumerate() {
                if j > 0 {
                    f.write_str(" ")?;
                }
                write!(f, "{comparator}")?;
            }
        }
        Ok(())
    }
}

/// Error creating a [Range] from a string.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RangeParseError {
    /// A whitespace separated comparator could not be understood.
    #[error("invalid comparator '{comparator}' in range '{range}'")]
    InvalidComparator {
        /// Range that was being parsed.
        range: String,
        /// The offending comparator.
        comparator: String,
    },
    /// One side of an `a - b` range is not a version.
    #[error("invalid hyphen range '{group}' in range '{range}'")]
    InvalidHyphenRange {
        /// Range that was being parsed.
        range: String,
        /// The clause-group holding the hyphen.
        group: String,
    },
}

impl FromStr for Range {
    type Err = RangeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let clause_groups = s
            .split("||")
            .map(|group| parse_group(s, group))
            .collect::<Result<_, _>>()?;
        Ok(Self { clause_groups })
    }
}

fn any_version() -> ClauseGroup {
    smallvec![Comparator::new(Operator::Ge, SemanticVersion::zero())]
}

fn no_version() -> ClauseGroup {
    smallvec![Comparator::new(Operator::Lt, SemanticVersion::zero())]
}

/// A version whose trailing components may be missing or wildcards.
#[derive(Debug, Clone, Copy)]
struct Partial {
    major: Option<u64>,
    minor: Option<u64>,
    patch: Option<u64>,
}

impl Partial {
    fn parse(text: &str) -> Option<Self> {
        let release = release_part(text);
        if release.is_empty() {
            return None;
        }
        let mut components = [None; 3];
        let mut wildcard = false;
        for (i, part) in release.split('.').enumerate() {
            if i >= components.len() {
                return None;
            }
            match part {
                "x" | "X" | "*" => wildcard = true,
                _ => {
                    let n = part.parse::<u64>().ok()?;
                    // Anything after a wildcard is a wildcard too.
                    if !wildcard {
                        components[i] = Some(n);
                    }
                }
            }
        }
        let [major, minor, patch] = components;
        Some(Self {
            major,
            minor,
            patch,
        })
    }

    fn is_full(&self) -> bool {
        self.major.is_some() && self.minor.is_some() && self.patch.is_some()
    }

    fn floor(&self) -> SemanticVersion {
        SemanticVersion::new(
            self.major.unwrap_or(0),
            self.minor.unwrap_or(0),
            self.patch.unwrap_or(0),
        )
    }

    /// First version above every version this partial stands for.
    /// Only meaningful when the major component is known.
    fn ceiling(&self) -> SemanticVersion {
        match self.minor {
            None => self.floor().bump_major(),
            Some(_) => self.floor().bump_minor(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Prefix {
    Caret,
    Tilde,
    Plain(Operator),
}

impl Prefix {
    fn split(token: &str) -> (Self, &str) {
        if let Some(rest) = token.strip_prefix('^') {
            (Prefix::Caret, rest)
        } else if let Some(rest) = token.strip_prefix("~>").or_else(|| token.strip_prefix('~')) {
            (Prefix::Tilde, rest)
        } else {
            let (op, rest) = Operator::split_prefix(token);
            (Prefix::Plain(op), rest)
        }
    }

    /// Expand `self partial` into primitive comparators.
    fn desugar(self, partial: Partial) -> Option<ClauseGroup> {
        let Some(major) = partial.major else {
            return match self {
                Prefix::Plain(Operator::Gt | Operator::Lt) => Some(no_version()),
                Prefix::Plain(Operator::Ne | Operator::StrictNe) => None,
                _ => Some(any_version()),
            };
        };
        let lower = partial.floor();
        let group = match self {
            Prefix::Caret => {
                let upper = match (major, partial.minor, partial.patch) {
                    (_, None, _) => lower.bump_major(),
                    (0, Some(_), None) => lower.bump_minor(),
                    (_, Some(_), None) => lower.bump_major(),
                    (0, Some(0), Some(_)) => lower.bump_patch(),
                    (0, Some(_), Some(_)) => lower.bump_minor(),
                    (_, Some(_), Some(_)) => lower.bump_major(),
                };
                smallvec![
                    Comparator::new(Operator::Ge, lower),
                    Comparator::new(Operator::Lt, upper),
                ]
            }
            Prefix::Tilde => {
                let upper = match partial.minor {
                    None => lower.bump_major(),
                    Some(_) => lower.bump_minor(),
                };
                smallvec![
                    Comparator::new(Operator::Ge, lower),
                    Comparator::new(Operator::Lt, upper),
                ]
            }
            Prefix::Plain(op) if partial.is_full() => smallvec![Comparator::new(op, lower)],
            Prefix::Plain(op) => match op {
                Operator::Gt => smallvec![Comparator::new(Operator::Ge, partial.ceiling())],
                Operator::Ge => smallvec![Comparator::new(Operator::Ge, lower)],
                Operator::Lt => smallvec![Comparator::new(Operator::Lt, lower)],
                Operator::Le => smallvec![Comparator::new(Operator::Lt, partial.ceiling())],
                Operator::Ne | Operator::StrictNe => return None,
                Operator::Exact | Operator::Eq | Operator::LooseEq | Operator::StrictEq => {
                    smallvec![
                        Comparator::new(Operator::Ge, lower),
                        Comparator::new(Operator::Lt, partial.ceiling()),
                    ]
                }
            },
        };
        Some(group)
    }
}

/// Split a clause-group on whitespace, gluing a detached operator to the
/// version that follows it, so `>= 1.2.3` reads as `>=1.2.3`.
fn tokenize(group: &str) -> Vec<String> {
    let is_bare_operator = |s: &str| s.chars().all(|c| "<>=!^~".contains(c));
    let mut tokens = Vec::new();
    let mut pending = String::new();
    for word in group.split_whitespace() {
        pending.push_str(word);
        if !is_bare_operator(&pending) {
            tokens.push(std::mem::take(&mut pending));
        }
    }
    if !pending.is_empty() {
        tokens.push(pending);
    }
    tokens
}

fn parse_group(range: &str, group: &str) -> Result<ClauseGroup, RangeParseError> {
    let tokens = tokenize(group);
    if tokens.is_empty() {
        return Ok(any_version());
    }

    if let [low, dash, high] = tokens.as_slice() {
        if dash == "-" {
            return parse_hyphen(low, high).ok_or_else(|| RangeParseError::InvalidHyphenRange {
                range: range.to_string(),
                group: group.trim().to_string(),
            });
        }
    }

    let mut comparators = ClauseGroup::new();
    for token in &tokens {
        let (prefix, rest) = Prefix::split(token);
        let desugared = Partial::parse(rest).and_then(|partial| prefix.desugar(partial));
        match desugared {
            Some(desugared) => comparators.extend(desugared),
            None => {
                return Err(RangeParseError::InvalidComparator {
                    range: range.to_string(),
                    comparator: token.clone(),
                })
            }
        }
    }
    Ok(comparators)
}

fn parse_hyphen(low: &str, high: &str) -> Option<ClauseGroup> {
    let low = Partial::parse(low)?;
    let high = Partial::parse(high)?;
    let mut group = ClauseGroup::new();
    if low.major.is_some() {
        group.push(Comparator::new(Operator::Ge, low.floor()));
    }
    if high.is_full() {
        group.push(Comparator::new(Operator::Le, high.floor()));
    } else if high.major.is_some() {
        group.push(Comparator::new(Operator::Lt, high.ceiling()));
    }
    if group.is_empty() {
        group = any_version();
    }
    Some(group)
}
