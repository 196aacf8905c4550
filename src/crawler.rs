// SPDX-License-Identifier: MPL-2.0

//! Discovery of every package reachable from a set of seeds.
//!
//! The crawler keeps a bounded number of [Resolver] calls in flight and polls
//! them all from the calling task. Bookkeeping (the `seen` set, the pending
//! queue and the universe) only happens between two completions, so it needs
//! no locking. Each name is admitted exactly once, which makes cycles and
//! diamonds in the dependency graph harmless.

use std::collections::VecDeque;

use futures::stream::{FuturesUnordered, StreamExt};
use log::{debug, info};
use semver_ranges::Range;

use crate::{
    CrawlError, PackageName, PackageUniverse, PackageVersionCollection, Request, Resolution,
    Resolver, Set, VersionEntry,
};

/// How many resolver calls may be in flight at once unless configured otherwise.
pub const DEFAULT_MAX_CONCURRENT: usize = 10;

/// Crawls a package universe through a [Resolver].
pub struct Crawler<'r, R> {
    resolver: &'r R,
    max_concurrent: usize,
}

impl<'r, R: Resolver> Crawler<'r, R> {
    /// A crawler admitting [DEFAULT_MAX_CONCURRENT] concurrent calls.
    pub fn new(resolver: &'r R) -> Self {
        Self {
            resolver,
            max_concurrent: DEFAULT_MAX_CONCURRENT,
        }
    }

    /// Change the number of concurrent calls. Zero is treated as one.
    pub fn with_max_concurrent(mut self, max_concurrent: usize) -> Self {
        self.max_concurrent = max_concurrent.max(1);
        self
    }

    /// The configured number of concurrent calls.
    pub fn max_concurrent(&self) -> usize {
        self.max_concurrent
    }

    /// Resolves every seed and, transitively, every dependency with a valid range.
    ///
    /// The first resolver failure aborts the crawl: calls still in flight are
    /// dropped, nothing more is admitted, and no universe is returned.
    pub async fn crawl<I, S>(&self, seeds: I) -> Result<PackageUniverse, CrawlError<R::Err>>
    where
        I: IntoIterator<Item = S>,
        S: Into<PackageName>,
    {
        let mut seen: Set<PackageName> = Set::default();
        let mut pending: VecDeque<PackageName> = VecDeque::new();
        for seed in seeds {
            let seed = seed.into();
            if seen.insert(seed.clone()) {
                pending.push_back(seed);
            }
        }

        let resolver = self.resolver;
        let mut universe = PackageUniverse::new();
        let mut in_flight = FuturesUnordered::new();

        loop {
            while in_flight.len() < self.max_concurrent {
                let Some(name) = pending.pop_front() else {
                    break;
                };
                debug!("resolving {name}");
                let request = Request::new(name);
                in_flight.push(async move {
                    let resolution = resolver.resolve(&request).await;
                    (request, resolution)
                });
            }

            // Done when nothing is in flight, the queue is necessarily empty then.
            let Some((request, resolution)) = in_flight.next().await else {
                break;
            };

            let manifests = match resolution {
                Ok(Resolution::Found(manifests)) => manifests,
                Ok(Resolution::NotFound) => {
                    debug!("{} is not in the registry", request.package_name);
                    Vec::new()
                }
                Err(source) => {
                    return Err(CrawlError::ResolverFailure {
                        package: request.package_name,
                        source,
                    })
                }
            };

            let mut versions = PackageVersionCollection::default();
            for manifest in manifests {
                for (dependency, range) in &manifest.meta.dependencies {
                    if !seen.contains(dependency) && Range::is_valid(range) {
                        seen.insert(dependency.clone());
                        pending.push_back(dependency.clone());
                    }
                }
                let meta = manifest.meta;
                versions.insert(meta.version.clone(), VersionEntry { meta });
            }
            universe.insert(request.package_name, versions);
        }

        info!(
            "crawl complete: {} packages, {} versions",
            universe.len(),
            universe.version_count()
        );
        Ok(universe)
    }
}

/// Crawls the universe reachable from `seeds` with [DEFAULT_MAX_CONCURRENT]
/// concurrent resolver calls.
pub async fn crawl<R, I, S>(resolver: &R, seeds: I) -> Result<PackageUniverse, CrawlError<R::Err>>
where
    R: Resolver,
    I: IntoIterator<Item = S>,
    S: Into<PackageName>,
{
    Crawler::new(resolver).crawl(seeds).await
}
