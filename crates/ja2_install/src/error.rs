//! Error types that can be emitted from this library

use miette::Diagnostic;
use std::path::PathBuf;
use thiserror::Error;

use crate::pipeline::Phase;

/// Error type for library
#[derive(Error, Diagnostic, Debug)]
pub enum Error {
    /// Transparent warpper for [`std::io::Error`]
    #[error(transparent)]
    IOError(#[from] std::io::Error),

    /// The installation plan could not be parsed
    #[error("installation plan is invalid")]
    InvalidPlan(#[from] serde_json::Error),

    /// A directory could not be listed while resolving a path
    #[error("unable to list {}", .path.display())]
    FilesystemUnavailable {
        /// Directory that was being listed
        path: PathBuf,
        /// Underlying failure
        source: std::io::Error,
    },

    /// The destination root has to exist before installing
    #[error("destination directory {} does not exist", .path.display())]
    #[diagnostic(help("run the installer from the mod directory or pass the Data directory of the mod"))]
    MissingDestination {
        /// Expected destination
        path: PathBuf,
    },

    /// One or more archives named by the plan are not in the source directory
    #[error("missing archives: {}", .names.join(", "))]
    #[diagnostic(help("make sure the source directory holds every archive the installation needs"))]
    MissingArchives {
        /// Every missing archive, in plan order
        names: Vec<String>,
    },

    /// An archive could not be opened or read
    #[error("archive {name} could not be read")]
    Archive {
        /// Archive name as given in the plan
        name: String,
        /// Underlying failure
        #[diagnostic_source]
        source: ja2_slf::error::Error,
    },

    /// An image could not be converted
    #[error("image {name} could not be converted")]
    Image {
        /// Image path relative to the destination
        name: String,
        /// Underlying failure
        #[diagnostic_source]
        source: ja2_sti::error::Error,
    },

    /// A resource is missing from the place it was looked up in
    #[error("could not find {resource} in {location}")]
    ResourceNotFound {
        /// Name of the resource
        resource: String,
        /// Archive or directory that was searched
        location: String,
    },

    /// An archive entry name points outside of the directory it is extracted to
    #[error("entry {0} would be written outside of the destination")]
    UnsafeEntryPath(String),

    /// The destination could not be written
    #[error("unable to write {}", .path.display())]
    IOWrite {
        /// File or directory being written
        path: PathBuf,
        /// Underlying failure
        source: std::io::Error,
    },

    /// A swap cannot be applied and was not applied by an earlier run either
    #[error("cannot replace {to}: {from} is missing and {to} does not hold the replacement")]
    MissingReplacementSource {
        /// Alternate file that should have been moved
        from: String,
        /// Canonical file it replaces
        to: String,
    },
}

/// Failure of an installation run
///
/// Names the phase and the step the run stopped at. Everything written before the failure stays
/// in place, running the same plan again continues from there.
#[derive(Error, Diagnostic, Debug)]
#[error("installation stopped during {phase} while {step}")]
pub struct PipelineError {
    /// Phase the run stopped in
    pub phase: Phase,
    /// Operation that failed, naming the archive, resource or path involved
    pub step: String,
    /// What went wrong
    #[source]
    #[diagnostic_source]
    pub error: Error,
}

/// Generic result type with crate's Error as its error variant
pub type Result<T> = core::result::Result<T, Error>;
