//! Path normalization utilities for cross-platform file handling.

use std::path::Path;

use crate::ArborError;

/// Normalizes a file path to a canonical UTF-8 string with forward slashes.
///
/// # Process
/// 1. Canonicalizes the path using `dunce::canonicalize` (removes `\\?\` prefix on Windows)
/// 2. Converts to UTF-8 string
/// 3. Replaces backslashes with forward slashes for consistent representation
///
/// # Errors
/// - Returns `ArborError::IoError` if canonicalization fails (file not found, permissions, etc.)
/// - Returns `ArborError::NonUtf8` if the path contains non-UTF-8 characters
pub fn normalize_path(path: &Path) -> Result<String, ArborError> {
    let canonical = dunce::canonicalize(path)?;
    let s = canonical
        .to_str()
        .ok_or_else(|| ArborError::NonUtf8(canonical.display().to_string()))?;
    Ok(s.replace('\\', "/"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_path_cargo_manifest() {
        let cargo_manifest = std::env::var("CARGO_MANIFEST_DIR")
            .map(|dir| Path::new(&dir).join("Cargo.toml"))
            .unwrap();

        let normalized = normalize_path(&cargo_manifest).unwrap();
        assert!(normalized.contains('/'));
        assert!(normalized.ends_with("Cargo.toml"));
        assert!(!normalized.contains('\\'));
    }

    #[test]
    fn test_normalize_nonexistent_path() {
        let result = normalize_path(Path::new("/this/does/not/exist/nowhere.js"));
        assert!(result.is_err());
    }
}
