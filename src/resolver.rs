// SPDX-License-Identifier: MPL-2.0

//! The capability the crawler uses to ask a registry about a package.

use std::error::Error;
use std::future::Future;

use crate::{PackageMetadata, PackageName};

/// A question for a [Resolver]: which versions of this package exist?
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Request {
    /// Package name.
    pub package_name: PackageName,
    /// Opaque hint interpreted by the resolver, empty when there is none.
    pub elaborator: String,
}

impl Request {
    /// Request for `package_name` without an elaborator.
    pub fn new(package_name: impl Into<PackageName>) -> Self {
        Self {
            package_name: package_name.into(),
            elaborator: String::new(),
        }
    }
}

/// One version of a package as reported by a [Resolver].
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Manifest {
    /// Unique and immutable id of this manifest: a version for registry
    /// packages, a commit for packages hosted in a repository.
    pub id: String,
    /// The request this manifest answers.
    pub request: Request,
    /// Package metadata.
    pub meta: PackageMetadata,
    /// A pointer on how to fetch the package.
    pub fetch: String,
}

/// What a [Resolver] knows about a package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// The registry has no such package.
    NotFound,
    /// Every published version of the package.
    Found(Vec<Manifest>),
}

impl Resolution {
    /// The manifests, none for [Resolution::NotFound].
    pub fn into_manifests(self) -> Vec<Manifest> {
        match self {
            Resolution::NotFound => Vec::new(),
            Resolution::Found(manifests) => manifests,
        }
    }
}

/// Trait that allows the crawler to retrieve every version of a package.
/// An implementor needs to be supplied to [crawl](crate::crawl).
///
/// Calls may overlap: the crawler keeps several requests in flight and polls
/// them all from a single task, so implementations don't need to be `Send`.
pub trait Resolver {
    /// The kind of error returned from [Resolver::resolve].
    ///
    /// Returning this signals that the whole crawl should fail with this error.
    /// A package that simply does not exist is not an error, see [Resolution::NotFound].
    type Err: Error + 'static;

    /// Fetch all published versions of `request.package_name`.
    fn resolve(&self, request: &Request) -> impl Future<Output = Result<Resolution, Self::Err>>;
}
