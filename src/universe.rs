// SPDX-License-Identifier: MPL-2.0

//! The package universe: every discovered package name and, for each,
//! the metadata of every version the registry knows about.

use indexmap::IndexMap;

use crate::{Map, PackageName};

/// Metadata of one published version of a package.
///
/// `version` is kept as the registry spelled it. It is only interpreted as a
/// semantic version when encoding, where a malformed string falls back to `0.0.0`.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PackageMetadata {
    /// Name of the package.
    pub name: PackageName,
    /// Version string of this release.
    pub version: String,
    /// Dependency name to version range, in declaration order.
    pub dependencies: IndexMap<PackageName, String>,
}

impl PackageMetadata {
    /// Metadata of a release without dependencies.
    pub fn new(name: impl Into<PackageName>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            dependencies: IndexMap::new(),
        }
    }

    /// Replace the dependencies of this release.
    pub fn with_dependencies<I, N, R>(mut self, dependencies: I) -> Self
    where
        I: IntoIterator<Item = (N, R)>,
        N: Into<PackageName>,
        R: Into<String>,
    {
        self.dependencies = dependencies
            .into_iter()
            .map(|(name, range)| (name.into(), range.into()))
            .collect();
        self
    }
}

/// One entry of a [PackageVersionCollection].
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VersionEntry {
    /// Metadata of that version.
    pub meta: PackageMetadata,
}

/// Every known version of one package, keyed by version string.
pub type PackageVersionCollection = Map<String, VersionEntry>;

/// All discovered packages.
///
/// Lookups are by name only, so the structure does not depend on the order in
/// which packages were discovered.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackageUniverse {
    packages: Map<PackageName, PackageVersionCollection>,
}

impl PackageUniverse {
    /// An empty universe.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the versions of a package, replacing any previous collection
    /// for that name.
    pub fn insert(
        &mut self,
        name: impl Into<PackageName>,
        versions: PackageVersionCollection,
    ) -> Option<PackageVersionCollection> {
        self.packages.insert(name.into(), versions)
    }

    /// Known versions of `name`, or [None] if the name was never discovered.
    ///
    /// A name whose registry lookup came back empty is present with no versions.
    pub fn get(&self, name: &str) -> Option<&PackageVersionCollection> {
        self.packages.get(name)
    }

    /// Whether `name` was discovered.
    pub fn contains(&self, name: &str) -> bool {
        self.packages.contains_key(name)
    }

    /// Number of discovered package names.
    pub fn len(&self) -> usize {
        self.packages.len()
    }

    /// Whether no package was discovered.
    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }

    /// Total number of versions over all packages.
    pub fn version_count(&self) -> usize {
        self.packages.values().map(|versions| versions.len()).sum()
    }

    /// Discovered names, in sorted order.
    pub fn package_names(&self) -> Vec<&PackageName> {
        let mut names: Vec<_> = self.packages.keys().collect();
        names.sort();
        names
    }

    /// Iterates over packages in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (&PackageName, &PackageVersionCollection)> {
        self.packages.iter()
    }
}

impl FromIterator<PackageMetadata> for PackageUniverse {
    /// Groups metadata by package name.
    fn from_iter<T: IntoIterator<Item = PackageMetadata>>(iter: T) -> Self {
        let mut universe = Self::new();
        for meta in iter {
            universe
                .packages
                .entry(meta.name.clone())
                .or_default()
                .insert(meta.version.clone(), VersionEntry { meta });
        }
        universe
    }
}
