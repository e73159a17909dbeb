//! conf.d fragment discovery and merging.
//!
//! Every `*.toml` file directly inside the directory is merged on top of the
//! base configuration. Fragments are applied in lexical file name order, so
//! `10-network.toml` overrides `00-base.toml`.

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::defaults::CONFIG_EXTENSION;
use crate::config::types::MissingDirPolicy;
use crate::errors::{ConfError, ConfResult};
use crate::store::Settings;
use crate::store::value::{Table, table_from_toml};

/// Glob pattern matching the fragments of `dir`.
///
/// The directory part is escaped so brackets or asterisks in real paths
/// are matched literally.
pub fn fragment_pattern(dir: &Path) -> String {
    format!(
        "{}/*.{CONFIG_EXTENSION}",
        glob::Pattern::escape(&dir.to_string_lossy())
    )
}

/// Find the fragment files of `dir`, sorted by file name.
///
/// # Errors
///
/// Returns `ConfError::Glob` if the pattern is invalid or the directory
/// cannot be read, and `ConfError::MissingDirectory` if the directory does
/// not exist and `policy` is [`MissingDirPolicy::Error`].
pub fn discover_fragments(dir: &Path, policy: MissingDirPolicy) -> ConfResult<Vec<PathBuf>> {
    let abs_dir = std::path::absolute(dir).unwrap_or_else(|_| dir.to_path_buf());

    if !abs_dir.is_dir() {
        return match policy {
            MissingDirPolicy::Ignore => {
                tracing::debug!(
                    event = "layerconf.confd.dir_missing_ignored",
                    path = %abs_dir.display()
                );
                Ok(Vec::new())
            }
            MissingDirPolicy::Error => Err(ConfError::MissingDirectory {
                path: abs_dir.display().to_string(),
            }),
        };
    }

    let pattern = fragment_pattern(&abs_dir);
    let entries = glob::glob(&pattern).map_err(|e| ConfError::Glob {
        pattern: pattern.clone(),
        message: e.to_string(),
    })?;

    let mut fragments = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| ConfError::Glob {
            pattern: pattern.clone(),
            message: e.to_string(),
        })?;
        if path.is_file() {
            fragments.push(path);
        }
    }

    fragments.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(fragments)
}

/// Read and parse one fragment.
pub fn read_fragment(path: &Path) -> ConfResult<Table> {
    let content = fs::read_to_string(path).map_err(|e| ConfError::Merge {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;
    let parsed: toml::Table = toml::from_str(&content).map_err(|e| ConfError::Merge {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;
    Ok(table_from_toml(parsed))
}

/// Merge every fragment of `dir` into the config layer of `settings`.
///
/// Returns the number of fragments merged. The first fragment that fails
/// stops the merge; fragments merged before it stay merged.
pub fn merge_directory(
    settings: &mut Settings,
    dir: &Path,
    policy: MissingDirPolicy,
) -> ConfResult<usize> {
    let fragments = discover_fragments(dir, policy)?;

    for (merged, path) in fragments.iter().enumerate() {
        let table = match read_fragment(path) {
            Ok(table) => table,
            Err(e) => {
                tracing::warn!(
                    event = "layerconf.confd.merge_failed",
                    path = %path.display(),
                    merged = merged,
                    remaining = fragments.len() - merged,
                    error = %e
                );
                return Err(e);
            }
        };
        settings.merge_table(table);
        tracing::debug!(
            event = "layerconf.confd.fragment_merged",
            path = %path.display()
        );
    }

    tracing::info!(
        event = "layerconf.confd.merged",
        dir = %dir.display(),
        count = fragments.len()
    );

    Ok(fragments.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Value;
    use tempfile::TempDir;

    fn fragment(dir: &TempDir, name: &str, content: &str) {
        fs::write(dir.path().join(name), content).unwrap();
    }

    #[test]
    fn test_fragments_sorted_by_file_name() {
        let dir = TempDir::new().unwrap();
        fragment(&dir, "b.toml", "");
        fragment(&dir, "a.toml", "");
        fragment(&dir, "10-late.toml", "");
        fragment(&dir, "notes.txt", "");
        fs::create_dir(dir.path().join("nested.toml")).unwrap();

        let names: Vec<_> = discover_fragments(dir.path(), MissingDirPolicy::Ignore)
            .unwrap()
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();

        assert_eq!(names, vec!["10-late.toml", "a.toml", "b.toml"]);
    }

    #[test]
    fn test_later_fragments_override_earlier() {
        let dir = TempDir::new().unwrap();
        fragment(&dir, "a.toml", "[category3]\nfirst = \"foo\"\nsecond = \"bar\"\n");
        fragment(&dir, "b.toml", "[category3]\nsecond = \"foobar\"\n");

        let mut settings = Settings::new();
        let merged = merge_directory(&mut settings, dir.path(), MissingDirPolicy::Ignore).unwrap();

        assert_eq!(merged, 2);
        assert_eq!(settings.get("category3.first"), Some(Value::from("foo")));
        assert_eq!(settings.get("category3.second"), Some(Value::from("foobar")));
    }

    #[test]
    fn test_broken_fragment_stops_merge_without_rollback() {
        let dir = TempDir::new().unwrap();
        fragment(&dir, "a.toml", "first = 1\n");
        fragment(&dir, "b.toml", "invalid toml [[[");
        fragment(&dir, "c.toml", "third = 3\n");

        let mut settings = Settings::new();
        let err = merge_directory(&mut settings, dir.path(), MissingDirPolicy::Ignore).unwrap_err();

        assert!(matches!(err, ConfError::Merge { ref path, .. } if path.ends_with("b.toml")));
        assert_eq!(settings.get("first"), Some(Value::Integer(1)));
        assert_eq!(settings.get("third"), None);
    }

    #[test]
    fn test_empty_directory_is_a_no_op() {
        let dir = TempDir::new().unwrap();
        let mut settings = Settings::new();
        assert_eq!(
            merge_directory(&mut settings, dir.path(), MissingDirPolicy::Error).unwrap(),
            0
        );
    }

    #[test]
    fn test_missing_directory_follows_policy() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("conf.d");
        let mut settings = Settings::new();

        assert_eq!(
            merge_directory(&mut settings, &missing, MissingDirPolicy::Ignore).unwrap(),
            0
        );

        let err = merge_directory(&mut settings, &missing, MissingDirPolicy::Error).unwrap_err();
        assert!(matches!(err, ConfError::MissingDirectory { .. }));
    }

    #[test]
    fn test_pattern_escapes_glob_metacharacters() {
        let dir = TempDir::new().unwrap();
        let odd = dir.path().join("conf[1].d");
        fs::create_dir(&odd).unwrap();
        fs::write(odd.join("a.toml"), "x = 1\n").unwrap();

        let fragments = discover_fragments(&odd, MissingDirPolicy::Error).unwrap();
        assert_eq!(fragments.len(), 1);
        assert!(fragment_pattern(&odd).contains("conf[[]1[]].d"));
    }
}
