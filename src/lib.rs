// SPDX-License-Identifier: MPL-2.0

//! Dependency-resolution front end producing CUDF problems.
//!
//! Deciding which package versions to install is left to an external
//! SAT-style solver. This crate prepares its input in three steps:
//!
//! 1. [crawl] discovers every package name reachable from a set of seeds,
//!    asking a [Resolver] for all known versions of each one.
//! 2. [encode_universe] translates the resulting [PackageUniverse] into CUDF
//!    packages, turning semver ranges into conjunctions of disjunctions of
//!    integer version constraints.
//! 3. [render] serializes a [cudf::Document] into the text solvers read,
//!    and [AspcudSolver] hands that text to an `aspcud`-compatible binary.
//!
//! ## API
//!
//! ```
//! # use cudf_universe::{crawl, encode_document, render, OfflineResolver};
//! # use futures::executor::block_on;
//! let mut registry = OfflineResolver::new();
//! registry.add_version("app", "1.0.0", [("dep", "^2.0.0")]);
//! registry.add_version("dep", "2.1.0", Vec::<(&str, &str)>::new());
//!
//! let universe = block_on(crawl(&registry, ["app"])).unwrap();
//! let doc = encode_document(&universe, &["app"]);
//! let text = render(&doc).unwrap();
//! assert!(text.contains("depends: dep >= 2000000, dep < 3000000"));
//! ```
//!
//! The [Resolver] is the only seam to the outside world. It is asked about
//! one package name at a time and either lists every published version with
//! its dependencies, says the package does not exist, or fails. A failure
//! aborts the whole crawl, since a partial universe would silently
//! under-constrain the solver.
//!
//! ## Concurrency
//!
//! The crawler runs on the task that awaits it and never spawns. Up to
//! [DEFAULT_MAX_CONCURRENT] resolver calls are polled together, which bounds
//! the load put on a registry; change it with [Crawler::with_max_concurrent].
//! Any executor works, `futures::executor::block_on` included.
//!
//! ## Logging
//!
//! Progress and skipped input are reported through the [log] facade.

#![warn(missing_docs)]

mod aspcud;
mod crawler;
pub mod cudf;
mod encode;
mod error;
mod provider;
mod render;
mod resolver;
mod type_aliases;
mod universe;

pub use aspcud::AspcudSolver;
pub use crawler::{crawl, Crawler, DEFAULT_MAX_CONCURRENT};
pub use encode::{
    encode_document, encode_package, encode_package_formula, encode_relop, encode_relop_symbol,
    encode_universe, encode_version, MAX_COMPONENT,
};
pub use error::{CrawlError, RenderError, SolveError};
pub use provider::OfflineResolver;
pub use render::{render, LINE_ENDING};
pub use resolver::{Manifest, Request, Resolution, Resolver};
pub use type_aliases::{Map, PackageName, Set};
pub use universe::{PackageMetadata, PackageUniverse, PackageVersionCollection, VersionEntry};

pub use semver_ranges::{Range, SemanticVersion};
