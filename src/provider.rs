// SPDX-License-Identifier: MPL-2.0

use std::collections::BTreeMap;
use std::convert::Infallible;

use indexmap::IndexMap;

use crate::{Manifest, Map, PackageMetadata, PackageName, Request, Resolution, Resolver};

/// A registry held entirely in memory.
///
/// With the `serde` feature it (de)serializes as a map from package name to a
/// map from version to dependencies, e.g. in RON:
///
/// ```ron
/// {
///     "app": { "1.0.0": { "dep": "^2.0.0" } },
///     "dep": { "2.0.0": {}, "2.1.0": {} },
/// }
/// ```
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct OfflineResolver {
    packages: Map<PackageName, BTreeMap<String, IndexMap<PackageName, String>>>,
}

impl OfflineResolver {
    /// Creates an empty OfflineResolver with no packages.
    pub fn new() -> Self {
        Self {
            packages: Map::default(),
        }
    }

    /// Registers a version of a package with its dependencies.
    /// Dependencies must be added with a single call to
    /// [add_version](OfflineResolver::add_version).
    /// All subsequent calls to
    /// [add_version](OfflineResolver::add_version) for a given
    /// package version pair will replace the dependencies by the new ones.
    pub fn add_version<I, N, R>(
        &mut self,
        package: impl Into<PackageName>,
        version: impl Into<String>,
        dependencies: I,
    ) where
        I: IntoIterator<Item = (N, R)>,
        N: Into<PackageName>,
        R: Into<String>,
    {
        let package_deps = dependencies
            .into_iter()
            .map(|(name, range)| (name.into(), range.into()))
            .collect();
        *self
            .packages
            .entry(package.into())
            .or_default()
            .entry(version.into())
            .or_default() = package_deps;
    }

    /// Lists packages that have been saved.
    pub fn packages(&self) -> impl Iterator<Item = &PackageName> {
        self.packages.keys()
    }

    /// Lists versions of saved packages in sorted order.
    /// Returns [None] if no information is available regarding that package.
    pub fn versions(&self, package: &str) -> Option<impl Iterator<Item = &String>> {
        self.packages.get(package).map(|k| k.keys())
    }

    /// Metadata of every saved version of `package`, in version string order.
    pub fn metadata<'a>(&'a self, package: &'a str) -> impl Iterator<Item = PackageMetadata> + 'a {
        self.packages
            .get(package)
            .into_iter()
            .flatten()
            .map(move |(version, dependencies)| PackageMetadata {
                name: package.to_string(),
                version: version.clone(),
                dependencies: dependencies.clone(),
            })
    }
}

impl Resolver for OfflineResolver {
    type Err = Infallible;

    async fn resolve(&self, request: &Request) -> Result<Resolution, Infallible> {
        if !self.packages.contains_key(&request.package_name) {
            return Ok(Resolution::NotFound);
        }
        let manifests = self
            .metadata(&request.package_name)
            .map(|meta| Manifest {
                id: meta.version.clone(),
                request: request.clone(),
                meta,
                fetch: "offline".to_string(),
            })
            .collect();
        Ok(Resolution::Found(manifests))
    }
}
