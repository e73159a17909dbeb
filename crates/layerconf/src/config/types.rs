//! Types shared by the loading, merging and facade modules.

use std::fmt;

use crate::errors::ConfError;

/// Construction phase in which a non-fatal failure happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadStage {
    /// Probing an explicitly named candidate file
    Candidate,
    /// Reading the file found on the default search path
    SearchPath,
    /// Merging the conf.d fragment directory
    ConfD,
}

impl fmt::Display for LoadStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LoadStage::Candidate => "candidate",
            LoadStage::SearchPath => "search_path",
            LoadStage::ConfD => "confd",
        };
        f.write_str(name)
    }
}

/// A failure swallowed while constructing a handle.
///
/// Construction never fails; these record what was skipped so callers can
/// tell an empty configuration from a broken one.
#[derive(Debug)]
pub struct LoadDiagnostic {
    pub stage: LoadStage,
    pub error: ConfError,
}

impl LoadDiagnostic {
    pub fn new(stage: LoadStage, error: ConfError) -> Self {
        Self { stage, error }
    }
}

impl fmt::Display for LoadDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.stage, self.error)
    }
}

/// What to do when the conf.d directory does not exist.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MissingDirPolicy {
    /// Treat a missing directory like an empty one.
    #[default]
    Ignore,
    /// Fail with `ConfError::MissingDirectory`.
    Error,
}
