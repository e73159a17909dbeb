//! File resolution: which file to load from and which file to save to.
//!
//! # Resolution Order
//!
//! With explicit candidates, they are probed in order:
//! 1. Every candidate but the last: the first one that reads and parses wins
//! 2. The last candidate: always the save target, loaded if it parses
//!
//! Without candidates, each search path directory is checked for
//! `<project>.toml` and the first file that exists is used.
//!
//! Resolution never fails. Failures end up in [`Resolution::diagnostics`].

use std::path::PathBuf;

use crate::config::defaults::{default_filename, default_search_paths};
use crate::config::types::{LoadDiagnostic, LoadStage};
use crate::errors::ConfError;
use crate::store::Settings;

/// Tunables for file resolution.
#[derive(Debug, Clone, Default)]
pub struct ResolveOptions {
    search_paths: Option<Vec<PathBuf>>,
}

impl ResolveOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the default search path list.
    pub fn with_search_paths<I, P>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.search_paths = Some(paths.into_iter().map(Into::into).collect());
        self
    }

    /// Directories to search for `<project>.toml`.
    pub fn search_paths(&self, project: &str) -> Vec<PathBuf> {
        match &self.search_paths {
            Some(paths) => paths.clone(),
            None => default_search_paths(project),
        }
    }
}

/// Outcome of resolving a project's configuration file.
#[derive(Debug)]
pub struct Resolution {
    pub settings: Settings,
    /// Save target
    pub filename: PathBuf,
    pub diagnostics: Vec<LoadDiagnostic>,
}

/// Resolve the active config file for `project`.
pub fn resolve(project: &str, candidates: &[PathBuf], options: &ResolveOptions) -> Resolution {
    match candidates.split_last() {
        Some((fallback, earlier)) => resolve_candidates(earlier, fallback),
        None => resolve_search_paths(project, options),
    }
}

fn resolve_candidates(earlier: &[PathBuf], fallback: &PathBuf) -> Resolution {
    let mut diagnostics = Vec::new();

    for candidate in earlier {
        let mut settings = Settings::new();
        match settings.read_file(candidate) {
            Ok(()) => {
                tracing::info!(
                    event = "layerconf.loading.candidate_loaded",
                    path = %candidate.display()
                );
                return Resolution {
                    settings,
                    filename: candidate.clone(),
                    diagnostics,
                };
            }
            Err(e) => record(&mut diagnostics, LoadStage::Candidate, e),
        }
    }

    let mut settings = Settings::new();
    match settings.read_file(fallback) {
        Ok(()) => tracing::info!(
            event = "layerconf.loading.fallback_loaded",
            path = %fallback.display()
        ),
        Err(e) => record(&mut diagnostics, LoadStage::Candidate, e),
    }

    Resolution {
        settings,
        filename: fallback.clone(),
        diagnostics,
    }
}

fn resolve_search_paths(project: &str, options: &ResolveOptions) -> Resolution {
    let file_name = default_filename(project);
    let mut diagnostics = Vec::new();

    for dir in options.search_paths(project) {
        let path = dir.join(&file_name);
        if !path.is_file() {
            continue;
        }

        let mut settings = Settings::new();
        match settings.read_file(&path) {
            Ok(()) => tracing::info!(
                event = "layerconf.loading.search_path_loaded",
                path = %path.display()
            ),
            Err(e) => record(&mut diagnostics, LoadStage::SearchPath, e),
        }

        return Resolution {
            settings,
            filename: path,
            diagnostics,
        };
    }

    tracing::debug!(
        event = "layerconf.loading.no_config_found",
        project = project,
        fallback = %file_name.display()
    );

    Resolution {
        settings: Settings::new(),
        filename: file_name,
        diagnostics,
    }
}

fn record(diagnostics: &mut Vec<LoadDiagnostic>, stage: LoadStage, error: ConfError) {
    // A missing candidate is routine; a file that exists but cannot be read
    // or parsed needs the user's attention.
    if error.is_not_found() {
        tracing::debug!(
            event = "layerconf.loading.file_missing",
            stage = %stage,
            error = %error
        );
    } else {
        tracing::warn!(
            event = "layerconf.loading.file_failed",
            stage = %stage,
            error = %error,
            "Config file exists but could not be loaded - continuing without it"
        );
    }
    diagnostics.push(LoadDiagnostic::new(stage, error));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Value;
    use std::fs;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_first_loadable_candidate_wins() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("missing.toml");
        let first = write(&temp_dir, "first.toml", "name = \"first\"\n");
        let last = write(&temp_dir, "last.toml", "name = \"last\"\n");

        let resolution = resolve("app", &[missing, first.clone(), last], &ResolveOptions::new());

        assert_eq!(resolution.filename, first);
        assert_eq!(resolution.settings.get("name"), Some(Value::from("first")));
        assert_eq!(resolution.diagnostics.len(), 1);
        assert!(resolution.diagnostics[0].error.is_not_found());
    }

    #[test]
    fn test_only_last_candidate_exists() {
        let temp_dir = TempDir::new().unwrap();
        let a = temp_dir.path().join("a.toml");
        let b = temp_dir.path().join("b.toml");
        let last = write(&temp_dir, "last.toml", "[server]\naddress = \"127.0.0.1:8080\"\n");

        let resolution = resolve("app", &[a, b, last.clone()], &ResolveOptions::new());

        assert_eq!(resolution.filename, last);
        assert_eq!(
            resolution.settings.get("server.address"),
            Some(Value::from("127.0.0.1:8080"))
        );
        assert_eq!(resolution.diagnostics.len(), 2);
    }

    #[test]
    fn test_last_candidate_is_save_target_even_when_missing() {
        let temp_dir = TempDir::new().unwrap();
        let broken = write(&temp_dir, "broken.toml", "invalid toml [[[");
        let target = temp_dir.path().join("nested").join("target.toml");

        let resolution = resolve("app", &[broken, target.clone()], &ResolveOptions::new());

        assert_eq!(resolution.filename, target);
        assert!(resolution.settings.all_settings().is_empty());
        assert_eq!(resolution.diagnostics.len(), 2);
        assert!(matches!(
            resolution.diagnostics[0].error,
            ConfError::Parse { .. }
        ));
        assert_eq!(resolution.diagnostics[1].stage, LoadStage::Candidate);
    }

    #[test]
    fn test_search_paths_first_existing_file_wins() {
        let early = TempDir::new().unwrap();
        let late = TempDir::new().unwrap();
        let empty = TempDir::new().unwrap();
        let late_file = write(&late, "app.toml", "origin = \"late\"\n");
        write(&early, "other.toml", "origin = \"ignored\"\n");

        let options = ResolveOptions::new().with_search_paths([
            empty.path().join("does-not-exist"),
            early.path().to_path_buf(),
            late.path().to_path_buf(),
        ]);
        let resolution = resolve("app", &[], &options);

        assert_eq!(resolution.filename, late_file);
        assert_eq!(resolution.settings.get("origin"), Some(Value::from("late")));
        assert!(resolution.diagnostics.is_empty());
    }

    #[test]
    fn test_search_paths_broken_file_is_still_save_target() {
        let dir = TempDir::new().unwrap();
        let broken = write(&dir, "app.toml", "invalid toml [[[");

        let options = ResolveOptions::new().with_search_paths([dir.path()]);
        let resolution = resolve("app", &[], &options);

        assert_eq!(resolution.filename, broken);
        assert!(resolution.settings.all_settings().is_empty());
        assert_eq!(resolution.diagnostics.len(), 1);
        assert_eq!(resolution.diagnostics[0].stage, LoadStage::SearchPath);
    }

    #[test]
    fn test_search_paths_nothing_found_uses_project_file_name() {
        let dir = TempDir::new().unwrap();
        let options = ResolveOptions::new().with_search_paths([dir.path()]);

        let resolution = resolve("test-project", &[], &options);

        assert_eq!(resolution.filename, PathBuf::from("test-project.toml"));
        assert!(resolution.diagnostics.is_empty());
        assert!(resolution.settings.all_settings().is_empty());
    }
}
