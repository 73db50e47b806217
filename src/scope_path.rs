use std::path::{Component, Path, PathBuf};

/// Resolves `.` and `..` without touching the filesystem.
pub fn normalize(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !normalized.pop() {
                    normalized.push("..");
                }
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}

pub fn is_within_scope(path: &Path, root: &Path) -> bool {
    let path = normalize(path);
    let root = normalize(root);

    if cfg!(windows) {
        let path_lower = path.to_string_lossy().to_ascii_lowercase();
        let root_lower = root.to_string_lossy().to_ascii_lowercase();
        return Path::new(&path_lower).starts_with(Path::new(&root_lower));
    }

    path.starts_with(&root)
}

/// Strictly inside: the root itself does not count.
pub fn is_strictly_within_scope(path: &Path, root: &Path) -> bool {
    is_within_scope(path, root) && normalize(path) != normalize(root)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_drops_current_dir_and_resolves_parent() {
        assert_eq!(normalize(Path::new("/foo/./bar/")), PathBuf::from("/foo/bar"));
        assert_eq!(normalize(Path::new("/foo/bar/../baz")), PathBuf::from("/foo/baz"));
    }

    #[test]
    fn within_scope_exact_match() {
        assert!(is_within_scope(Path::new("/foo/bar"), Path::new("/foo/bar")));
        assert!(is_within_scope(Path::new("/foo/bar/"), Path::new("/foo/bar")));
        assert!(!is_strictly_within_scope(Path::new("/foo/bar/"), Path::new("/foo/bar")));
    }

    #[test]
    fn within_scope_child_path() {
        assert!(is_within_scope(Path::new("/foo/bar/baz"), Path::new("/foo/bar")));
        assert!(is_strictly_within_scope(Path::new("/foo/bar/baz"), Path::new("/foo/bar")));
        assert!(!is_within_scope(Path::new("/foo/barbaz"), Path::new("/foo/bar")));
    }

    #[test]
    fn escaping_child_is_out_of_scope() {
        assert!(!is_within_scope(Path::new("/foo/bar/../other"), Path::new("/foo/bar")));
    }

    #[test]
    fn not_within_scope_sibling() {
        assert!(!is_within_scope(Path::new("/foo/other"), Path::new("/foo/bar")));
    }
}
