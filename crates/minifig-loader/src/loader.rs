//! Parents file discovery.

use std::path::{Path, PathBuf};

use crate::types::{HierarchyError, HierarchyResult};

/// Conventional file name of the parents table.
pub const PARENTS_FILE_NAME: &str = "parents.txt";

/// Environment variable naming an explicit parents file.
pub const PARENTS_PATH_ENV: &str = "MINIFIG_PARENTS_PATH";

/// Finds the parents table inside an add-on or data directory.
///
/// Looks for `parents.txt` directly in `dir`, then in `dir/data`.
pub fn discover_parents_file<P: AsRef<Path>>(dir: P) -> HierarchyResult<PathBuf> {
    let dir = dir.as_ref();

    if !dir.is_dir() {
        return Err(HierarchyError::DirectoryNotFound {
            path: dir.display().to_string(),
        });
    }

    let candidates = [dir.join(PARENTS_FILE_NAME), dir.join("data").join(PARENTS_FILE_NAME)];
    candidates
        .into_iter()
        .find(|path| path.is_file())
        .ok_or_else(|| HierarchyError::FileNotFound {
            path: dir.join(PARENTS_FILE_NAME).display().to_string(),
        })
}

/// Resolves the parents file to load.
///
/// An explicit path wins, then the `MINIFIG_PARENTS_PATH` environment
/// variable, then discovery in the current directory.
pub fn resolve_parents_path(explicit: Option<&Path>) -> HierarchyResult<PathBuf> {
    if let Some(path) = explicit {
        return Ok(path.to_path_buf());
    }

    if let Some(path) = std::env::var_os(PARENTS_PATH_ENV) {
        return Ok(PathBuf::from(path));
    }

    discover_parents_file(std::env::current_dir()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_discover_in_root() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(PARENTS_FILE_NAME), "Group A:\n").unwrap();

        let found = discover_parents_file(dir.path()).unwrap();
        assert_eq!(found, dir.path().join(PARENTS_FILE_NAME));
    }

    #[test]
    fn test_discover_in_data_subdir() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("data")).unwrap();
        fs::write(dir.path().join("data").join(PARENTS_FILE_NAME), "").unwrap();

        let found = discover_parents_file(dir.path()).unwrap();
        assert!(found.ends_with("data/parents.txt"));
    }

    #[test]
    fn test_discover_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            discover_parents_file(dir.path()),
            Err(HierarchyError::FileNotFound { .. })
        ));
    }

    #[test]
    fn test_discover_missing_directory() {
        assert!(matches!(
            discover_parents_file("/no/such/dir"),
            Err(HierarchyError::DirectoryNotFound { .. })
        ));
    }

    #[test]
    fn test_explicit_path_wins() {
        let path = Path::new("/tmp/custom-parents.txt");
        assert_eq!(resolve_parents_path(Some(path)).unwrap(), path);
    }
}
