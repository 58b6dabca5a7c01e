//! Client filename normalization.
//!
//! Uploaded names are attacker controlled. Only the final path component is
//! kept, so a name can never address anything outside the upload directory.
use crate::error::StorageError;

/// Reduce a client-supplied filename to a single safe path component.
///
/// Splits on both `/` and `\`, keeps the last segment, drops control
/// characters and trims whitespace. Rejects names that end up empty, `.` or
/// `..`.
///
/// ```rust
/// use storage::sanitize_filename;
///
/// assert_eq!(sanitize_filename("a.png").unwrap(), "a.png");
/// assert_eq!(sanitize_filename("../../etc/plan.pdf").unwrap(), "plan.pdf");
/// assert_eq!(sanitize_filename(r"C:\drawings\floor 1.jpg").unwrap(), "floor 1.jpg");
/// assert!(sanitize_filename("uploads/..").is_err());
/// ```
pub fn sanitize_filename(raw: &str) -> Result<String, StorageError> {
    let basename = raw.rsplit(['/', '\\']).next().unwrap_or_default();
    let cleaned: String = basename.chars().filter(|c| !c.is_control()).collect();
    let cleaned = cleaned.trim();

    if cleaned.is_empty() || cleaned == "." || cleaned == ".." {
        return Err(StorageError::InvalidFilename(raw.to_string()));
    }

    Ok(cleaned.to_string())
}
