//! Request DTOs for the admin API
//!
//! Defines the structure of incoming HTTP request bodies.

use serde::Deserialize;

use crate::cache::MAX_KEY_LENGTH;

/// Request body for pattern invalidation (POST /cache/invalidate)
///
/// Every key containing `pattern` as a substring is removed.
#[derive(Debug, Clone, Deserialize)]
pub struct InvalidateRequest {
    pub pattern: String,
}

impl InvalidateRequest {
    /// Validates the request data
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        if self.pattern.is_empty() {
            // An empty substring would match, and wipe, every key
            return Some("Pattern cannot be empty".to_string());
        }
        if self.pattern.len() > MAX_KEY_LENGTH {
            return Some(format!(
                "Pattern exceeds maximum length of {} bytes",
                MAX_KEY_LENGTH
            ));
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalidate_request_deserialize() {
        let json = r#"{"pattern": "articles"}"#;
        let req: InvalidateRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.pattern, "articles");
        assert!(req.validate().is_none());
    }

    #[test]
    fn test_validate_empty_pattern() {
        let req = InvalidateRequest {
            pattern: String::new(),
        };
        assert!(req.validate().is_some());
    }

    #[test]
    fn test_validate_oversized_pattern() {
        let req = InvalidateRequest {
            pattern: "x".repeat(MAX_KEY_LENGTH + 1),
        };
        assert!(req.validate().is_some());
    }
}
