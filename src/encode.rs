// SPDX-License-Identifier: MPL-2.0

//! Translation of a [PackageUniverse] into CUDF.
//!
//! Two representations of constraints meet here. A semver range is a
//! disjunction of clause-groups, each one a conjunction of comparators, while a
//! CUDF `depends:` formula is a conjunction of disjunctions. Every dependency
//! range is folded into CUDF clauses by a Cartesian product over its
//! clause-groups: `^0.14.0 || ^15.0.0` has two groups of two comparators and
//! turns into four clauses of two alternatives each.
//!
//! Versions become integers, `major * 1_000_000 + minor * 1_000 + patch`.

use log::{debug, warn};
use semver_ranges::{Comparator, Operator, Range, SemanticVersion};

use crate::cudf::{Clause, Constraint, Document, Formula, Package, RelOp, Request};
use crate::{PackageMetadata, PackageUniverse};

/// Largest minor or patch component that encodes without loss.
pub const MAX_COMPONENT: u64 = 999;

/// Flatten a version into a CUDF version integer.
///
/// Strictly order preserving as long as minor and patch stay within
/// [MAX_COMPONENT]. Larger components are clamped, so ordering still never
/// inverts but distinct versions may collide.
pub fn encode_version(version: &SemanticVersion) -> u64 {
    version
        .major
        .saturating_mul(1_000_000)
        .saturating_add(version.minor.min(MAX_COMPONENT) * 1_000)
        .saturating_add(version.patch.min(MAX_COMPONENT))
}

/// The CUDF operator matching a comparator operator.
pub fn encode_relop(operator: Operator) -> RelOp {
    match operator {
        Operator::Exact | Operator::Eq | Operator::LooseEq | Operator::StrictEq => RelOp::Eq,
        Operator::Ne | Operator::StrictNe => RelOp::Neq,
        Operator::Gt => RelOp::Gt,
        Operator::Ge => RelOp::Geq,
        Operator::Lt => RelOp::Lt,
        Operator::Le => RelOp::Leq,
    }
}

/// The CUDF operator for a comparator written as `symbol`.
/// Unknown symbols are read as `=`.
pub fn encode_relop_symbol(symbol: &str) -> RelOp {
    Operator::from_symbol(symbol).map_or(RelOp::Eq, encode_relop)
}

fn encode_constraint(name: &str, comparator: &Comparator) -> Constraint {
    Constraint::new(
        name,
        encode_relop(comparator.operator),
        encode_version(&comparator.version),
    )
}

/// Fold the clause-groups of `range` into CUDF clauses over `name`.
///
/// The first clause-group seeds one singleton clause per comparator. Every
/// following group extends each existing clause with each of its comparators,
/// so the result has as many clauses as the product of the group sizes. An
/// empty group is always satisfied and leaves no clause at all.
pub fn encode_package_formula(name: &str, range: &Range) -> Formula {
    let mut clauses: Option<Vec<Clause>> = None;
    for group in range.clause_groups() {
        clauses = Some(match clauses {
            None => group
                .iter()
                .map(|comparator| vec![encode_constraint(name, comparator)])
                .collect(),
            Some(clauses) => {
                let mut product = Vec::with_capacity(clauses.len() * group.len());
                for clause in &clauses {
                    for comparator in group {
                        let mut extended = clause.clone();
                        extended.push(encode_constraint(name, comparator));
                        product.push(extended);
                    }
                }
                product
            }
        });
    }
    Formula::from(clauses.unwrap_or_default())
}

/// Encode one version of a package.
///
/// The result is a candidate: neither installed nor previously installed.
/// Dependencies whose range does not parse are left out, and a version
/// string that does not parse is encoded as `0.0.0`.
pub fn encode_package(meta: &PackageMetadata) -> Package {
    let mut depends = Formula::new();
    for (name, constraint) in &meta.dependencies {
        match constraint.parse::<Range>() {
            Ok(range) => depends.extend(encode_package_formula(name, &range)),
            Err(err) => debug!("{}@{}: skipping dependency: {err}", meta.name, meta.version),
        }
    }

    let version = meta.version.parse::<SemanticVersion>().unwrap_or_else(|err| {
        debug!("{}: {err}, encoding as 0.0.0", meta.name);
        SemanticVersion::zero()
    });

    Package {
        depends: Some(depends),
        ..Package::new(meta.name.as_str(), encode_version(&version))
    }
}

/// Encode every version of every package of the universe.
///
/// Packages come out sorted by name, then by version. CUDF wants
/// `(package, version)` pairs to be unique: when two version strings of a
/// package encode to the same integer (`1.0.0` and `1.0.0-rc.1`), only the
/// first in string order is kept.
pub fn encode_universe(universe: &PackageUniverse) -> Vec<Package> {
    let mut packages = Vec::with_capacity(universe.version_count());
    for name in universe.package_names() {
        let Some(versions) = universe.get(name) else {
            continue;
        };
        let mut encoded: Vec<(&String, Package)> = versions
            .iter()
            .map(|(version, entry)| (version, encode_package(&entry.meta)))
            .collect();
        encoded.sort_by(|(a_str, a), (b_str, b)| a.version.cmp(&b.version).then(a_str.cmp(b_str)));

        let mut last = None;
        for (version, package) in encoded {
            if last == Some(package.version) {
                warn!(
                    "{name}@{version} encodes to {}, which is already taken",
                    package.version
                );
                continue;
            }
            last = Some(package.version);
            packages.push(package);
        }
    }
    packages
}

/// Assemble the document handed to a solver: no preamble, the whole encoded
/// universe, and a request to install any version of each of `install`.
pub fn encode_document<S: AsRef<str>>(universe: &PackageUniverse, install: &[S]) -> Document {
    let install = (!install.is_empty()).then(|| {
        install
            .iter()
            .map(|name| Constraint::new(name.as_ref(), RelOp::Geq, 0))
            .collect()
    });
    Document {
        preamble: None,
        universe: encode_universe(universe),
        request: Request {
            install,
            ..Request::default()
        },
    }
}
