//! File layout and atomic writes for the durable pair.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

pub const PLAYERS_FILE: &str = "players.json";
pub const META_FILE: &str = "cache-meta.json";

/// Durable-store failure. Never leaves this crate: the store logs it and
/// degrades to a miss or a no-op.
#[derive(Debug, Error)]
pub(crate) enum CacheIoError {
    #[error("failed to read {path}: {source}")]
    Read { path: PathBuf, source: io::Error },

    #[error("failed to write {path}: {source}")]
    Write { path: PathBuf, source: io::Error },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("failed to serialize snapshot: {0}")]
    Serialize(serde_json::Error),
}

pub fn players_path(dir: &Path) -> PathBuf {
    dir.join(PLAYERS_FILE)
}

pub fn meta_path(dir: &Path) -> PathBuf {
    dir.join(META_FILE)
}

pub(crate) fn ensure_parent_dirs(path: &Path) -> Result<(), CacheIoError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|source| CacheIoError::Write {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    Ok(())
}

/// Write to `<name>.tmp` then rename over the target.
pub(crate) fn atomic_write(path: &Path, contents: &[u8]) -> Result<(), CacheIoError> {
    ensure_parent_dirs(path)?;
    let mut tmp_name = path.as_os_str().to_owned();
    tmp_name.push(".tmp");
    let tmp_path = PathBuf::from(tmp_name);

    std::fs::write(&tmp_path, contents).map_err(|source| CacheIoError::Write {
        path: tmp_path.clone(),
        source,
    })?;
    std::fs::rename(&tmp_path, path).map_err(|source| CacheIoError::Write {
        path: path.to_path_buf(),
        source,
    })
}

/// Compact JSON, written atomically.
pub(crate) fn atomic_write_json<T: serde::Serialize>(
    path: &Path,
    value: &T,
) -> Result<(), CacheIoError> {
    let json = serde_json::to_vec(value).map_err(CacheIoError::Serialize)?;
    atomic_write(path, &json)
}

pub(crate) fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, CacheIoError> {
    let bytes = std::fs::read(path).map_err(|source| CacheIoError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_slice(&bytes).map_err(|source| CacheIoError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Remove a file; a missing file is fine.
pub(crate) fn remove_if_exists(path: &Path) -> Result<bool, CacheIoError> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(source) => Err(CacheIoError::Write {
            path: path.to_path_buf(),
            source,
        }),
    }
}
