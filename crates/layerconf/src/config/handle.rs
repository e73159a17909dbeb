//! Thread-safe configuration handle.
//!
//! A [`ConfigHandle`] owns one [`Settings`] store plus the path it saves to.
//! Every accessor takes the handle's mutex for a single store operation, so
//! individual gets and sets are atomic but there are no multi-key
//! transactions.
//!
//! # Construction
//!
//! Construction never fails. Files that are missing, unreadable or broken
//! are skipped and recorded as [`LoadDiagnostic`]s; a caller that ignores
//! [`ConfigHandle::diagnostics`] works with whatever could be loaded.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use serde::de::DeserializeOwned;

use crate::config::confd::merge_directory;
use crate::config::loading::{ResolveOptions, resolve};
use crate::config::traits::Conf;
use crate::config::types::{LoadDiagnostic, LoadStage, MissingDirPolicy};
use crate::errors::{ConfError, ConfResult};
use crate::store::value::table_to_toml;
use crate::store::{Settings, Table, Value};

#[derive(Debug)]
struct HandleState {
    settings: Settings,
    filename: PathBuf,
}

#[derive(Debug)]
pub struct ConfigHandle {
    state: Mutex<HandleState>,
    diagnostics: Vec<LoadDiagnostic>,
}

impl ConfigHandle {
    /// Start configuring a handle for `project`.
    pub fn builder(project: impl Into<String>) -> ConfigBuilder {
        ConfigBuilder::new(project)
    }

    /// Load from the first usable candidate, or from the default search
    /// paths when `candidates` is empty.
    ///
    /// The last candidate is the save target whenever no earlier one loads.
    pub fn new(project: &str, candidates: &[PathBuf]) -> Self {
        Self::builder(project).candidates(candidates.iter().cloned()).build()
    }

    /// Like [`ConfigHandle::new`], then merge every `*.toml` fragment of
    /// `confd` on top. An empty `confd` path skips the merge.
    ///
    /// A failed merge is kept in [`ConfigHandle::merge_error`]; fragments
    /// merged before the failure stay applied.
    pub fn new_confd(project: &str, confd: impl AsRef<Path>, candidates: &[PathBuf]) -> Self {
        Self::builder(project)
            .candidates(candidates.iter().cloned())
            .confd(confd.as_ref())
            .build()
    }

    /// Copy `settings` into a new handle saving to `filename`.
    ///
    /// Later changes to either side are not visible to the other.
    pub fn from_settings(settings: &Settings, filename: impl Into<PathBuf>) -> Self {
        Self::builder("")
            .snapshot(settings)
            .save_to(filename)
            .build()
    }

    /// Copy `settings`, then merge the fragments of `confd` on top.
    pub fn from_settings_confd(
        settings: &Settings,
        confd: impl AsRef<Path>,
        filename: impl Into<PathBuf>,
    ) -> Self {
        Self::builder("")
            .snapshot(settings)
            .confd(confd.as_ref())
            .save_to(filename)
            .build()
    }

    fn state(&self) -> MutexGuard<'_, HandleState> {
        self.state.lock().unwrap_or_else(|poisoned| {
            tracing::error!(
                event = "layerconf.handle.lock_poisoned",
                "Settings lock poisoned by a panicking thread, recovering"
            );
            poisoned.into_inner()
        })
    }

    /// Failures skipped while the handle was built.
    pub fn diagnostics(&self) -> &[LoadDiagnostic] {
        &self.diagnostics
    }

    /// The conf.d failure recorded during construction, if any.
    pub fn merge_error(&self) -> Option<&ConfError> {
        self.diagnostics
            .iter()
            .find(|d| d.stage == LoadStage::ConfD)
            .map(|d| &d.error)
    }

    /// Path written by `save`.
    pub fn filename(&self) -> PathBuf {
        self.state().filename.clone()
    }

    /// Set `key` in the override layer from anything convertible to a
    /// [`Value`]. Same as [`Conf::set`] without the explicit conversion.
    pub fn set(&self, key: &str, value: impl Into<Value>) {
        self.state().settings.set(key, value);
    }

    pub fn set_default(&self, key: &str, value: impl Into<Value>) {
        self.state().settings.set_default(key, value);
    }

    pub fn is_set(&self, key: &str) -> bool {
        self.state().settings.is_set(key)
    }

    pub fn all_keys(&self) -> Vec<String> {
        self.state().settings.all_keys()
    }

    pub fn all_settings(&self) -> Table {
        self.state().settings.all_settings()
    }

    /// Merge the fragments of `dir` into this handle.
    ///
    /// The lock is held for the whole merge, so readers never see a
    /// half-applied fragment set unless the merge fails part way.
    pub fn merge_dir(&self, dir: impl AsRef<Path>, policy: MissingDirPolicy) -> ConfResult<usize> {
        let mut state = self.state();
        merge_directory(&mut state.settings, dir.as_ref(), policy)
    }

    /// Deserialize the subtree at `key`.
    ///
    /// An absent key deserializes from an empty table, so structs whose
    /// fields all have serde defaults still succeed.
    pub fn unmarshal_key<T: DeserializeOwned>(&self, key: &str) -> ConfResult<T> {
        let value = match self.get(key) {
            Some(value) => value.to_toml(),
            None => toml::Value::Table(toml::Table::new()),
        };
        value.try_into().map_err(|e: toml::de::Error| ConfError::Unmarshal {
            key: key.to_string(),
            message: e.to_string(),
        })
    }

    /// Deserialize the whole merged tree.
    pub fn unmarshal<T: DeserializeOwned>(&self) -> ConfResult<T> {
        let tree = toml::Value::Table(table_to_toml(&self.all_settings()));
        tree.try_into().map_err(|e: toml::de::Error| ConfError::Unmarshal {
            key: String::new(),
            message: e.to_string(),
        })
    }
}

impl Conf for ConfigHandle {
    fn get(&self, key: &str) -> Option<Value> {
        self.state().settings.get(key)
    }

    fn set(&self, key: &str, value: Value) {
        self.state().settings.set(key, value);
    }

    /// Write the merged settings to [`ConfigHandle::filename`], creating
    /// missing parent directories.
    ///
    /// The settings are serialized before the file is touched, so a
    /// serialization failure leaves any existing file intact.
    fn save(&self) -> ConfResult<()> {
        let state = self.state();
        let path = state.filename.as_path();

        if path.as_os_str().is_empty() {
            return Err(ConfError::FileCreate {
                path: String::new(),
                source: io::Error::new(io::ErrorKind::InvalidInput, "no save target configured"),
            });
        }

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| ConfError::DirectoryCreate {
                path: parent.display().to_string(),
                source,
            })?;
        }

        let content = state.settings.to_toml_string()?;
        fs::write(path, content).map_err(|source| ConfError::FileCreate {
            path: path.display().to_string(),
            source,
        })?;

        tracing::info!(event = "layerconf.handle.saved", path = %path.display());
        Ok(())
    }

    fn write(&self, out: &mut dyn Write) -> ConfResult<()> {
        let content = self.state().settings.to_toml_string()?;
        out.write_all(content.as_bytes())?;
        out.flush()?;
        Ok(())
    }
}

/// Builder for [`ConfigHandle`].
///
/// ```no_run
/// use layerconf::{Conf, ConfigHandle};
///
/// let config = ConfigHandle::builder("myapp")
///     .candidate("/etc/myapp/myapp.toml")
///     .candidate("./myapp.toml")
///     .confd("/etc/myapp/conf.d")
///     .build();
/// let port = config.get_int("server.port");
/// ```
#[derive(Debug, Clone)]
pub struct ConfigBuilder {
    project: String,
    candidates: Vec<PathBuf>,
    options: ResolveOptions,
    confd: Option<PathBuf>,
    missing_confd: MissingDirPolicy,
    snapshot: Option<Settings>,
    save_to: Option<PathBuf>,
}

impl ConfigBuilder {
    pub fn new(project: impl Into<String>) -> Self {
        Self {
            project: project.into(),
            candidates: Vec::new(),
            options: ResolveOptions::new(),
            confd: None,
            missing_confd: MissingDirPolicy::default(),
            snapshot: None,
            save_to: None,
        }
    }

    pub fn candidate(mut self, path: impl Into<PathBuf>) -> Self {
        self.candidates.push(path.into());
        self
    }

    pub fn candidates<I, P>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.candidates.extend(paths.into_iter().map(Into::into));
        self
    }

    /// Replace the default search path list used when no candidates are given.
    pub fn search_paths<I, P>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.options = self.options.with_search_paths(paths);
        self
    }

    /// Fragment directory merged after loading. Empty paths are ignored.
    pub fn confd(mut self, dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        self.confd = (!dir.as_os_str().is_empty()).then_some(dir);
        self
    }

    pub fn missing_confd(mut self, policy: MissingDirPolicy) -> Self {
        self.missing_confd = policy;
        self
    }

    /// Start from a copy of `settings` instead of resolving files.
    pub fn snapshot(mut self, settings: &Settings) -> Self {
        self.snapshot = Some(settings.snapshot());
        self
    }

    /// Override the save target picked during resolution.
    pub fn save_to(mut self, path: impl Into<PathBuf>) -> Self {
        self.save_to = Some(path.into());
        self
    }

    pub fn build(self) -> ConfigHandle {
        let (mut settings, filename, mut diagnostics) = match self.snapshot {
            Some(snapshot) => {
                let filename = self
                    .save_to
                    .or_else(|| snapshot.config_file().map(Path::to_path_buf))
                    .unwrap_or_default();
                (snapshot, filename, Vec::new())
            }
            None => {
                let resolution = resolve(&self.project, &self.candidates, &self.options);
                let filename = self.save_to.unwrap_or(resolution.filename);
                (resolution.settings, filename, resolution.diagnostics)
            }
        };

        if let Some(dir) = &self.confd {
            if let Err(e) = merge_directory(&mut settings, dir, self.missing_confd) {
                tracing::warn!(
                    event = "layerconf.handle.confd_failed",
                    dir = %dir.display(),
                    error = %e,
                    "conf.d merge failed - continuing with fragments merged so far"
                );
                diagnostics.push(LoadDiagnostic::new(LoadStage::ConfD, e));
            }
        }

        tracing::debug!(
            event = "layerconf.handle.built",
            project = %self.project,
            filename = %filename.display(),
            diagnostics = diagnostics.len()
        );

        ConfigHandle {
            state: Mutex::new(HandleState { settings, filename }),
            diagnostics,
        }
    }
}
