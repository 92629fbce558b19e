//! Data directory resolution.
//!
//! The only file dashflow writes is its trace log. It lives in the first of:
//!
//! 1. `data_dir` from [`Config`], with a leading `~` expanded
//! 2. the platform data directory from [`ProjectDirs`] (on Linux
//!    `$XDG_DATA_HOME/dashflow`, else `~/.local/share/dashflow`)
//! 3. `<system temp dir>/dashflow`, when no home directory can be determined

use crate::Config;
use directories::{BaseDirs, ProjectDirs};
use std::env;
use std::path::{Path, PathBuf};

const APP_DIR: &str = "dashflow";

/// Resolves the data directory from `config` and the platform conventions.
#[must_use]
pub fn data_dir(config: &Config) -> PathBuf {
    let base = BaseDirs::new();
    resolve_data_dir(
        config.data_dir.as_deref(),
        platform_data_dir(),
        base.as_ref().map(BaseDirs::home_dir),
    )
}

/// The platform data directory for dashflow, if a home directory is known.
#[must_use]
pub fn platform_data_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", APP_DIR).map(|dirs| dirs.data_dir().to_path_buf())
}

/// Environment-free core of [`data_dir`].
///
/// # Parameters
///
/// * `configured` - Explicit directory from the configuration, may start with `~`
/// * `platform` - Result of [`platform_data_dir`]
/// * `home` - Home directory used for `~` expansion
#[must_use]
pub fn resolve_data_dir(configured: Option<&Path>, platform: Option<PathBuf>, home: Option<&Path>) -> PathBuf {
    if let Some(dir) = configured {
        return expand_tilde(dir, home);
    }
    platform.unwrap_or_else(|| env::temp_dir().join(APP_DIR))
}

/// Replaces a leading `~` component with `home`. Other paths are returned as is.
///
/// ```
/// use dashflow::infrastructure::expand_tilde;
/// use std::path::{Path, PathBuf};
///
/// let home = Path::new("/home/ana");
/// assert_eq!(expand_tilde(Path::new("~/traces"), Some(home)), PathBuf::from("/home/ana/traces"));
/// assert_eq!(expand_tilde(Path::new("/var/lib/x"), Some(home)), PathBuf::from("/var/lib/x"));
/// ```
#[must_use]
pub fn expand_tilde(path: &Path, home: Option<&Path>) -> PathBuf {
    match (path.strip_prefix("~"), home) {
        (Ok(rest), Some(home)) => home.join(rest),
        _ => path.to_path_buf(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configured_directory_wins() {
        let dir = resolve_data_dir(
            Some(Path::new("~/dash")),
            Some(PathBuf::from("/platform/dashflow")),
            Some(Path::new("/home/u")),
        );
        assert_eq!(dir, PathBuf::from("/home/u/dash"));
    }

    #[test]
    fn falls_back_to_platform_then_temp() {
        assert_eq!(
            resolve_data_dir(None, Some(PathBuf::from("/platform/dashflow")), Some(Path::new("/home/u"))),
            PathBuf::from("/platform/dashflow")
        );
        assert_eq!(resolve_data_dir(None, None, None), env::temp_dir().join("dashflow"));
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn platform_directory_is_named_after_the_crate() {
        if let Some(dir) = platform_data_dir() {
            assert!(dir.components().any(|c| c.as_os_str() == "dashflow"), "{}", dir.display());
        }
    }

    #[test]
    fn tilde_without_home_is_left_alone() {
        assert_eq!(expand_tilde(Path::new("~/x"), None), PathBuf::from("~/x"));
    }
}
