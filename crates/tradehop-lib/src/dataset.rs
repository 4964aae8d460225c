use std::env;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use tracing::debug;

use crate::error::{Error, Result};

/// Default filename for the trade database.
const DATASET_FILENAME: &str = "trade.db";

/// Environment variable overriding the default dataset location.
pub const DATASET_ENV: &str = "TRADEHOP_DB";

/// Resolve the default dataset location using platform-specific project directories.
pub fn default_dataset_path() -> Result<PathBuf> {
    let dirs =
        ProjectDirs::from("com", "tradehop", "tradehop").ok_or(Error::ProjectDirsUnavailable)?;
    Ok(normalize_data_dir(dirs.data_dir()).join(DATASET_FILENAME))
}

fn normalize_data_dir(path: &Path) -> PathBuf {
    #[cfg(windows)]
    {
        normalize_windows_data_dir(path)
    }
    #[cfg(not(windows))]
    {
        path.to_path_buf()
    }
}

#[cfg(windows)]
/// Upper bound on duplicate-segment collapses.
const MAX_NORMALIZATION_ITERATIONS: usize = 100;

#[cfg(windows)]
/// Collapse the duplicated `tradehop\tradehop` segment `directories` yields on Windows.
fn normalize_windows_data_dir(path: &Path) -> PathBuf {
    use std::ffi::OsStr;

    fn eq_ignore_ascii_case(a: &OsStr, b: &OsStr) -> bool {
        a.to_string_lossy()
            .eq_ignore_ascii_case(&b.to_string_lossy())
    }

    fn try_collapse_duplicate(current: &Path) -> Option<PathBuf> {
        let parent = current.parent()?;
        let grandparent = parent.parent()?;
        if !eq_ignore_ascii_case(parent.file_name()?, grandparent.file_name()?) {
            return None;
        }
        let mut base = grandparent.to_path_buf();
        if let Some(file_name) = current.file_name() {
            base.push(file_name);
        }
        Some(base)
    }

    let mut current = path.to_path_buf();
    for _ in 0..MAX_NORMALIZATION_ITERATIONS {
        match try_collapse_duplicate(&current) {
            Some(next) if next != current => current = next,
            _ => break,
        }
    }
    current
}

/// Locate the trade database.
///
/// Resolution order:
/// 1. Explicit `target` argument when provided.
/// 2. `TRADEHOP_DB` environment variable.
/// 3. Platform-specific project data directory.
///
/// A directory resolves to `trade.db` inside it. The file must exist.
pub fn resolve_dataset_path(target: Option<&Path>) -> Result<PathBuf> {
    resolve_with_env(target, env::var_os(DATASET_ENV))
}

fn resolve_with_env(target: Option<&Path>, env_value: Option<OsString>) -> Result<PathBuf> {
    let resolved = match (target, env_value) {
        (Some(explicit), _) => canonical_dataset_path(explicit),
        (None, Some(env_path)) if !env_path.is_empty() => {
            canonical_dataset_path(Path::new(&env_path))
        }
        _ => default_dataset_path()?,
    };

    debug!(path = %resolved.display(), "resolved dataset path");
    if !resolved.is_file() {
        return Err(Error::DatasetNotFound { path: resolved });
    }
    Ok(resolved)
}

fn canonical_dataset_path(path: &Path) -> PathBuf {
    if path.is_dir() {
        path.join(DATASET_FILENAME)
    } else {
        path.to_path_buf()
    }
}
