//! Filesystem layout for Moneta data.
//!
//! All persistent state lives in a single directory (default `~/.moneta`)
//! holding `moneta.db` plus its WAL siblings. Resolution order for the
//! data directory: explicit flag, `MONETA_DATA_DIR`, then the default.

use std::path::{Path, PathBuf};

/// Environment variable overriding the data directory.
pub const DATA_DIR_ENV: &str = "MONETA_DATA_DIR";

/// Default data directory: `~/.moneta`.
pub fn default_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".moneta")
}

/// Resolves the data directory from an optional explicit override.
pub fn resolve_data_dir(explicit: Option<&Path>) -> PathBuf {
    if let Some(dir) = explicit {
        return dir.to_path_buf();
    }
    if let Ok(dir) = std::env::var(DATA_DIR_ENV) {
        if !dir.is_empty() {
            return PathBuf::from(dir);
        }
    }
    default_data_dir()
}

/// Database file inside a data directory: `<data_dir>/moneta.db`.
pub fn db_path(data_dir: &Path) -> PathBuf {
    data_dir.join("moneta.db")
}

/// Expands a leading `~/` to the user's home directory.
pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_data_dir() {
        assert!(default_data_dir().ends_with(".moneta"));
    }

    #[test]
    fn test_explicit_override_wins() {
        let dir = resolve_data_dir(Some(Path::new("/tmp/custom")));
        assert_eq!(dir, PathBuf::from("/tmp/custom"));
    }

    #[test]
    fn test_db_path() {
        let db = db_path(Path::new("/tmp/moneta-data"));
        assert_eq!(db, PathBuf::from("/tmp/moneta-data/moneta.db"));
    }

    #[test]
    fn test_expand_tilde_passthrough() {
        assert_eq!(expand_tilde("/abs/path"), PathBuf::from("/abs/path"));
        assert_eq!(expand_tilde("rel/path"), PathBuf::from("rel/path"));
    }

    #[test]
    fn test_expand_tilde_home() {
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_tilde("~/x"), home.join("x"));
        }
    }
}
