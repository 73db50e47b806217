use crate::error::AppError;
use std::path::{Component, Path, PathBuf};

const MAX_NAME_LEN: usize = 255;

/// Validates a model-supplied target folder and returns it as a relative path.
///
/// Nested segments (`Projects/2024`) are allowed; anything that could address
/// a location outside the base directory is rejected.
pub fn validate_target_folder(folder: &str) -> Result<PathBuf, AppError> {
    let trimmed = folder.trim();
    if trimmed.is_empty() {
        return Err(AppError::MalformedPlan("folder name is empty".to_string()));
    }
    if trimmed.contains('\0') {
        return Err(AppError::MalformedPlan(
            "folder name contains a NUL byte".to_string(),
        ));
    }

    let normalized = trimmed.replace('\\', "/");
    if is_windows_style_path(&normalized) {
        return Err(AppError::MalformedPlan(format!(
            "absolute folder not allowed: {folder}"
        )));
    }

    let mut relative = PathBuf::new();
    for component in Path::new(&normalized).components() {
        match component {
            Component::Normal(segment) => {
                if segment.len() > MAX_NAME_LEN {
                    return Err(AppError::MalformedPlan(format!(
                        "folder segment too long: {}",
                        segment.to_string_lossy()
                    )));
                }
                relative.push(segment);
            }
            Component::CurDir => {}
            Component::ParentDir => {
                return Err(AppError::MalformedPlan(format!(
                    "path traversal (.. component) not allowed: {folder}"
                )));
            }
            Component::RootDir | Component::Prefix(_) => {
                return Err(AppError::MalformedPlan(format!(
                    "absolute folder not allowed: {folder}"
                )));
            }
        }
    }

    if relative.as_os_str().is_empty() {
        return Err(AppError::MalformedPlan(format!(
            "folder name has no usable segment: {folder}"
        )));
    }
    Ok(relative)
}

/// Files in a plan must be direct children of the base directory.
pub fn validate_file_name(name: &str) -> Result<(), AppError> {
    if name.is_empty() {
        return Err(AppError::MalformedPlan("file name is empty".to_string()));
    }
    if name == "." || name == ".." {
        return Err(AppError::MalformedPlan(format!(
            "not a file name: {name}"
        )));
    }
    if name.contains('/') || name.contains('\\') || name.contains('\0') {
        return Err(AppError::MalformedPlan(format!(
            "file name must not contain separators: {name}"
        )));
    }
    Ok(())
}

fn is_windows_style_path(path: &str) -> bool {
    let bytes = path.as_bytes();
    bytes.len() >= 2 && bytes[1] == b':' && bytes[0].is_ascii_alphabetic()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_and_nested_folders_accepted() {
        assert_eq!(validate_target_folder("Docs").unwrap(), PathBuf::from("Docs"));
        assert_eq!(
            validate_target_folder("Existing Folder/Images").unwrap(),
            PathBuf::from("Existing Folder").join("Images")
        );
        assert_eq!(
            validate_target_folder("./Reports/").unwrap(),
            PathBuf::from("Reports")
        );
    }

    #[test]
    fn test_backslashes_treated_as_separators() {
        assert_eq!(
            validate_target_folder("Work\\Invoices").unwrap(),
            PathBuf::from("Work").join("Invoices")
        );
        assert!(validate_target_folder("..\\outside").is_err());
    }

    #[test]
    fn test_traversal_rejected() {
        assert!(validate_target_folder("..").is_err());
        assert!(validate_target_folder("../escape").is_err());
        assert!(validate_target_folder("Docs/../../escape").is_err());
    }

    #[test]
    fn test_absolute_folders_rejected() {
        assert!(validate_target_folder("/etc").is_err());
        assert!(validate_target_folder("C:\\Windows").is_err());
        assert!(validate_target_folder("c:/Users").is_err());
    }

    #[test]
    fn test_empty_folders_rejected() {
        assert!(validate_target_folder("").is_err());
        assert!(validate_target_folder("   ").is_err());
        assert!(validate_target_folder("./.").is_err());
    }

    #[test]
    fn test_file_names() {
        assert!(validate_file_name("report final.pdf").is_ok());
        assert!(validate_file_name("a;b.txt").is_ok());
        assert!(validate_file_name("").is_err());
        assert!(validate_file_name("..").is_err());
        assert!(validate_file_name("sub/file.txt").is_err());
        assert!(validate_file_name("sub\\file.txt").is_err());
    }
}
