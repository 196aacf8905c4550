// SPDX-License-Identifier: MPL-2.0

//! In-memory model of a CUDF document.
//!
//! CUDF (Common Upgradeability Description Format) is the input language of
//! solvers such as `aspcud`. A document has an optional preamble declaring
//! extra package properties, a universe of packages with their version
//! qualified dependencies, and a request. Versions are positive integers,
//! see [encode_version](crate::encode_version) for how semantic versions map to them.

use std::fmt::{self, Display};

use crate::PackageName;

/// Relational operators allowed in CUDF constraints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RelOp {
    /// `=`
    Eq,
    /// `!=`
    Neq,
    /// `>`
    Gt,
    /// `>=`
    Geq,
    /// `<`
    Lt,
    /// `<=`
    Leq,
}

impl RelOp {
    /// The CUDF spelling of this operator.
    pub fn symbol(self) -> &'static str {
        match self {
            RelOp::Eq => "=",
            RelOp::Neq => "!=",
            RelOp::Gt => ">",
            RelOp::Geq => ">=",
            RelOp::Lt => "<",
            RelOp::Leq => "<=",
        }
    }
}

impl Display for RelOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// A version-qualified package reference, `name op version`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Constraint {
    /// Package referred to.
    pub name: PackageName,
    /// How versions of `name` compare to `version`.
    pub op: RelOp,
    /// Encoded version.
    pub version: u64,
}

impl Constraint {
    /// `name op version`.
    pub fn new(name: impl Into<PackageName>, op: RelOp, version: u64) -> Self {
        Self {
            name: name.into(),
            op,
            version,
        }
    }
}

impl Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.name, self.op, self.version)
    }
}

/// Constraints of which at least one must hold.
pub type Clause = Vec<Constraint>;

/// A conjunction of [Clause]s, the value of a `depends:` field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Formula {
    clauses: Vec<Clause>,
}

impl Formula {
    /// The empty conjunction.
    pub fn new() -> Self {
        Self::default()
    }

    /// Clauses in order.
    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    /// Number of clauses.
    pub fn len(&self) -> usize {
        self.clauses.len()
    }

    /// Whether there is no clause at all.
    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// Append a clause.
    pub fn push(&mut self, clause: Clause) {
        self.clauses.push(clause);
    }
}

impl From<Vec<Clause>> for Formula {
    fn from(clauses: Vec<Clause>) -> Self {
        Self { clauses }
    }
}

impl FromIterator<Clause> for Formula {
    fn from_iter<T: IntoIterator<Item = Clause>>(iter: T) -> Self {
        Self {
            clauses: iter.into_iter().collect(),
        }
    }
}

impl Extend<Clause> for Formula {
    fn extend<T: IntoIterator<Item = Clause>>(&mut self, iter: T) {
        self.clauses.extend(iter);
    }
}

impl IntoIterator for Formula {
    type Item = Clause;
    type IntoIter = std::vec::IntoIter<Clause>;

    fn into_iter(self) -> Self::IntoIter {
        self.clauses.into_iter()
    }
}

/// `a >= 1 | a < 2, b = 3`: clauses are joined by commas, the alternatives
/// inside one clause by pipes.
impl Display for Formula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, clause) in self.clauses.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            for (j, constraint) in clause.iter().enumerate() {
                if j > 0 {
                    f.write_str(" | ")?;
                }
                write!(f, "{constraint}")?;
            }
        }
        Ok(())
    }
}

/// A plain conjunction of constraints, used by `conflicts:`, `provides:` and
/// the request lines.
pub type PackageList = Vec<Constraint>;

/// Comma-separated rendering of a [PackageList].
pub(crate) struct DisplayList<'a>(pub(crate) &'a [Constraint]);

impl Display for DisplayList<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, constraint) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{constraint}")?;
        }
        Ok(())
    }
}

/// What an upgrade must preserve about an installed package.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Keep {
    /// This exact version must stay installed.
    Version,
    /// Some version of the package must stay installed.
    Package,
    /// The features it provides must stay available.
    Feature,
    /// Nothing.
    None,
}

impl Display for Keep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Keep::Version => "version",
            Keep::Package => "package",
            Keep::Feature => "feature",
            Keep::None => "none",
        })
    }
}

/// The type of a property declared in the preamble.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PropertyType {
    /// Free text.
    String,
    /// Integer greater than zero.
    PosInt,
    /// Any integer.
    Int,
    /// `true` or `false`.
    Bool,
    /// One of the listed values.
    Enum(Vec<String>),
}

impl Display for PropertyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyType::String => f.write_str("string"),
            PropertyType::PosInt => f.write_str("posint"),
            PropertyType::Int => f.write_str("int"),
            PropertyType::Bool => f.write_str("bool"),
            PropertyType::Enum(values) => write!(f, "enum [ {} ]", values.join(", ")),
        }
    }
}

/// A property declaration of the preamble.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Property {
    /// Name of the property.
    pub name: String,
    /// Its type.
    pub property_type: PropertyType,
    /// Value taken by packages that don't set it, written as in CUDF.
    pub default: Option<String>,
}

impl Property {
    /// A property without default value.
    pub fn new(name: impl Into<String>, property_type: PropertyType) -> Self {
        Self {
            name: name.into(),
            property_type,
            default: None,
        }
    }

    /// Set the default value.
    pub fn with_default(mut self, default: impl Into<String>) -> Self {
        self.default = Some(default.into());
        self
    }
}

/// Document-wide metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Preamble {
    /// Extra package properties.
    pub properties: Vec<Property>,
    /// `univ-checksum:`
    pub universe_checksum: Option<String>,
    /// `status-checksum:`
    pub status_checksum: Option<String>,
    /// `req-checksum:`
    pub request_checksum: Option<String>,
}

/// One `(package, version)` pair of the universe.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Package {
    /// Package name.
    pub package: PackageName,
    /// Encoded version.
    pub version: u64,
    /// Whether it is currently installed.
    pub installed: bool,
    /// Whether it was installed before the last operation.
    pub was_installed: Option<bool>,
    /// What it needs.
    pub depends: Option<Formula>,
    /// What it cannot be installed with.
    pub conflicts: Option<PackageList>,
    /// Features it provides.
    pub provides: Option<PackageList>,
    /// Upgrade preservation.
    pub keep: Option<Keep>,
}

impl Package {
    /// An uninstalled package with no relationships.
    pub fn new(package: impl Into<PackageName>, version: u64) -> Self {
        Self {
            package: package.into(),
            version,
            installed: false,
            was_installed: None,
            depends: None,
            conflicts: None,
            provides: None,
            keep: None,
        }
    }
}

/// What the solver is asked to do.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Request {
    /// Packages to install.
    pub install: Option<PackageList>,
    /// Packages to remove.
    pub remove: Option<PackageList>,
    /// Packages to upgrade.
    pub upgrade: Option<PackageList>,
}

/// A complete problem statement for a solver.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Document {
    /// Optional metadata block.
    pub preamble: Option<Preamble>,
    /// Packages, rendered in this order.
    pub universe: Vec<Package>,
    /// The request.
    pub request: Request,
}
