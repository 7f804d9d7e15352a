use lazy_static::lazy_static;
use regex::Regex;

use crate::shared::constants::{FALLBACK_CONTENT_TYPE, MAX_OBJECT_NAME_BYTES, PDF_CONTENT_TYPE};

lazy_static! {
    /// Characters object storage refuses or mangles in object names:
    /// carriage return, line feed and other ASCII control characters
    pub static ref FORBIDDEN_OBJECT_NAME_CHARS: Regex = Regex::new(r"[\x00-\x1F\x7F]").unwrap();
}

/// Check an object name before it reaches the backend
///
/// Returns a human readable reason when the name is unusable.
pub fn validate_object_name(name: &str) -> Result<(), String> {
    if name.trim().is_empty() {
        return Err("Object name must not be empty".to_string());
    }
    if name.len() > MAX_OBJECT_NAME_BYTES {
        return Err(format!(
            "Object name must be at most {} bytes",
            MAX_OBJECT_NAME_BYTES
        ));
    }
    if FORBIDDEN_OBJECT_NAME_CHARS.is_match(name) {
        return Err("Object name must not contain control characters".to_string());
    }
    if name == "." || name == ".." {
        return Err("Object name must not be '.' or '..'".to_string());
    }
    Ok(())
}

/// Content type stored with an object, derived from its name
pub fn content_type_for(name: &str) -> &'static str {
    if name.to_lowercase().ends_with(".pdf") {
        PDF_CONTENT_TYPE
    } else {
        FALLBACK_CONTENT_TYPE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_object_name_valid() {
        assert!(validate_object_name("a.pdf").is_ok());
        assert!(validate_object_name("reports/2024/q1 summary.pdf").is_ok());
        assert!(validate_object_name("überblick.pdf").is_ok());
        assert!(validate_object_name(&"a".repeat(MAX_OBJECT_NAME_BYTES)).is_ok());
    }

    #[test]
    fn test_validate_object_name_invalid() {
        assert!(validate_object_name("").is_err()); // empty
        assert!(validate_object_name("   ").is_err()); // blank
        assert!(validate_object_name("a\nb.pdf").is_err()); // line feed
        assert!(validate_object_name("a\rb.pdf").is_err()); // carriage return
        assert!(validate_object_name("..").is_err());
        assert!(validate_object_name(&"a".repeat(MAX_OBJECT_NAME_BYTES + 1)).is_err());
    }

    #[test]
    fn test_content_type_for() {
        assert_eq!(content_type_for("a.pdf"), "application/pdf");
        assert_eq!(content_type_for("A.PDF"), "application/pdf");
        assert_eq!(content_type_for("report.txt"), "application/octet-stream");
        assert_eq!(content_type_for("pdf"), "application/octet-stream");
    }
}
