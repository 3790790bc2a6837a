use crate::error::{GameverError, Result};

/// Checks that a version name is usable as a single directory component under the download root.
pub fn validate_version_name(name: &str) -> Result<()> {
    let invalid = |reason| {
        Err(GameverError::Validation {
            name: name.to_string(),
            reason,
        })
    };

    if name.trim().is_empty() {
        return invalid("name must not be empty");
    }
    if name.contains('/') || name.contains('\\') {
        return invalid("name must not contain path separators");
    }
    if name == "." || name == ".." {
        return invalid("name must not be a relative path component");
    }
    if name.contains('\0') {
        return invalid("name must not contain NUL bytes");
    }
    Ok(())
}
