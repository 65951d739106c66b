use once_cell::sync::Lazy;
use regex::Regex;

/// Input validation utilities for the auth service

// Compile regex patterns once at startup
static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
    // This regex is hardcoded and validated - it is a compile-time constant in practice
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$")
        .expect("hardcoded email regex is invalid - fix source code")
});

pub const NAME_MIN_CHARS: usize = 2;
pub const NAME_MAX_CHARS: usize = 50;
pub const PASSWORD_MIN_CHARS: usize = 6;

/// Normalize an email for lookup, uniqueness checks, and storage.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Validate email format.
pub fn validate_email(email: &str) -> bool {
    !email.is_empty() && email.len() <= 254 && EMAIL_REGEX.is_match(email)
}

/// Validate a display name (2-50 characters after trimming).
pub fn validate_name(name: &str) -> bool {
    let len = name.trim().chars().count();
    (NAME_MIN_CHARS..=NAME_MAX_CHARS).contains(&len)
}

/// Validate password length.
pub fn validate_password(password: &str) -> bool {
    password.chars().count() >= PASSWORD_MIN_CHARS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_email() {
        assert!(validate_email("user@example.com"));
        assert!(validate_email("test.user+tag@sub.example.co.uk"));
    }

    #[test]
    fn test_invalid_email() {
        assert!(!validate_email("invalid"));
        assert!(!validate_email("@example.com"));
        assert!(!validate_email("user@"));
        assert!(!validate_email("user @example.com"));
    }

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("  Ann@X.COM  "), "ann@x.com");
        assert_eq!(normalize_email("a@x.com"), "a@x.com");
    }

    #[test]
    fn test_valid_name() {
        assert!(validate_name("Ann"));
        assert!(validate_name("  Jo  ")); // trimmed before counting
        assert!(validate_name(&"a".repeat(50)));
    }

    #[test]
    fn test_invalid_name() {
        assert!(!validate_name("A")); // Too short
        assert!(!validate_name("   ")); // Whitespace only
        assert!(!validate_name(&"a".repeat(51))); // Too long
    }

    #[test]
    fn test_password_length() {
        assert!(validate_password("secret1"));
        assert!(validate_password("123456"));
        assert!(!validate_password("12345"));
        assert!(!validate_password(""));
    }
}
