//! Input Normalization
//!
//! The core assumes callers have already validated input shape; the only
//! normalization applied here is canonicalizing emails so that lookups and
//! the uniqueness constraint see one spelling per address.

/// Normalize an email address for storage and lookup
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("  Alice@Example.COM "), "alice@example.com");
        assert_eq!(normalize_email("bob@example.com"), "bob@example.com");
    }
}
