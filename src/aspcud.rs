// SPDX-License-Identifier: MPL-2.0

//! Handing a document to an external CUDF solver.
//!
//! The solver is a separate program reading its problem from a file and
//! writing the solution to another: `aspcud <input> <output> <criteria>`.
//! Its output is returned verbatim, interpreting it is up to the caller.

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use log::{debug, info};

use crate::cudf::Document;
use crate::{render, SolveError};

/// An external solver following the `aspcud` command line convention.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AspcudSolver {
    program: PathBuf,
    criteria: String,
}

impl Default for AspcudSolver {
    fn default() -> Self {
        Self {
            program: PathBuf::from("aspcud"),
            criteria: "trendy".to_string(),
        }
    }
}

impl AspcudSolver {
    /// `aspcud` from the `PATH`, optimizing with the `trendy` criteria.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use another solver binary.
    pub fn with_program(mut self, program: impl Into<PathBuf>) -> Self {
        self.program = program.into();
        self
    }

    /// Use another optimization criteria.
    pub fn with_criteria(mut self, criteria: impl Into<String>) -> Self {
        self.criteria = criteria.into();
        self
    }

    /// The solver binary.
    pub fn program(&self) -> &Path {
        &self.program
    }

    /// The optimization criteria.
    pub fn criteria(&self) -> &str {
        &self.criteria
    }

    /// Render `doc`, run the solver on it and return what it wrote.
    ///
    /// The document is rendered before anything touches the file system, so
    /// an unrenderable document never reaches the solver.
    pub fn solve(&self, doc: &Document) -> Result<String, SolveError> {
        let text = render(doc)?;

        let input = tempfile::Builder::new()
            .prefix("universe")
            .suffix(".cudf")
            .tempfile()?;
        fs::write(input.path(), text)?;
        let output = tempfile::Builder::new()
            .prefix("solution")
            .suffix(".cudf")
            .tempfile()?;

        let args: [OsString; 3] = [
            input.path().into(),
            output.path().into(),
            self.criteria.clone().into(),
        ];
        info!("running {} on {} packages", self.program.display(), doc.universe.len());
        debug!("{} {:?}", self.program.display(), args);
        let result = Command::new(&self.program).args(&args).output()?;

        if !result.status.success() {
            return Err(SolveError::SolverFailed {
                program: self.program.display().to_string(),
                status: result.status,
                stderr: String::from_utf8_lossy(&result.stderr).into_owned(),
            });
        }
        Ok(fs::read_to_string(output.path())?)
    }
}

#[cfg(all(test, unix))]
mod tests {
    use std::os::unix::fs::PermissionsExt;

    use super::*;
    use crate::cudf::{Package, Preamble, Property, PropertyType};

    /// A stand-in solver: a shell script copying its input to its output.
    fn fake_solver(dir: &Path, body: &str) -> PathBuf {
        let path = dir.join("solver.sh");
        fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    fn doc() -> Document {
        Document {
            universe: vec![Package::new("app", 1_000_000)],
            ..Document::default()
        }
    }

    #[test]
    fn returns_the_solver_output_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        let solver = AspcudSolver::new()
            .with_program(fake_solver(dir.path(), r##"cp "$1" "$2"; echo "# $3" >> "$2""##));
        let output = solver.solve(&doc()).unwrap();
        assert!(output.starts_with("package: app"));
        assert!(output.ends_with("# trendy\n"));
    }

    #[test]
    fn failing_solver_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let solver =
            AspcudSolver::new().with_program(fake_solver(dir.path(), "echo broken >&2; exit 3"));
        match solver.solve(&doc()) {
            Err(SolveError::SolverFailed { stderr, status, .. }) => {
                assert_eq!(stderr.trim(), "broken");
                assert_eq!(status.code(), Some(3));
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn unrenderable_document_never_runs_the_solver() {
        let mut doc = doc();
        doc.preamble = Some(Preamble {
            properties: vec![Property::new("kind", PropertyType::Enum(Vec::new()))],
            ..Preamble::default()
        });
        let solver = AspcudSolver::new().with_program("/nonexistent/solver");
        assert!(matches!(solver.solve(&doc), Err(SolveError::Render(_))));
    }
}
