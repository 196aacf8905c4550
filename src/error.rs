// SPDX-License-Identifier: MPL-2.0

//! Handling errors of the crawl, render and solve stages.

use std::error::Error;
use std::process::ExitStatus;

use thiserror::Error;

use crate::PackageName;

/// Errors that may occur while crawling a package universe.
///
/// A package that does not exist is not an error, it just contributes no versions.
#[derive(Error, Debug)]
pub enum CrawlError<E: Error + 'static> {
    /// The [Resolver](crate::Resolver) failed for a package. The crawl was
    /// abandoned and no universe is returned.
    #[error("resolving package {package} failed")]
    ResolverFailure {
        /// Package whose resolution failed.
        package: PackageName,
        /// Error raised by the implementer of [Resolver](crate::Resolver).
        source: E,
    },
}

/// Errors that may occur while rendering a CUDF document.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    /// A preamble property declaration cannot be expressed in CUDF.
    #[error("property {property} cannot be rendered: {reason}")]
    UnrenderableProperty {
        /// Name of the property.
        property: String,
        /// What is wrong with it.
        reason: String,
    },
}

/// Errors that may occur while handing a document to an external solver.
#[derive(Error, Debug)]
pub enum SolveError {
    /// The document could not be rendered, the solver was not started.
    #[error("the CUDF document cannot be rendered")]
    Render(#[from] RenderError),
    /// Writing the input, spawning the solver or reading its output failed.
    #[error("solver input/output failed")]
    Io(#[from] std::io::Error),
    /// The solver ran but reported failure.
    #[error("{program} exited with {status}: {stderr}")]
    SolverFailed {
        /// The solver binary.
        program: String,
        /// Its exit status.
        status: ExitStatus,
        /// What it wrote on standard error.
        stderr: String,
    },
}
