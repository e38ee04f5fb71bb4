//! Email address utilities

use once_cell::sync::Lazy;
use regex::Regex;

// Pragmatic address check: one @, no whitespace, a dotted domain
static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+\-]+@[A-Za-z0-9\-]+(\.[A-Za-z0-9\-]+)*\.[A-Za-z]{2,}$")
        .expect("email regex is valid")
});

/// Maximum length of an address (RFC 5321 path limit)
pub const MAX_EMAIL_LENGTH: usize = 254;

/// Trim and lowercase an address; codes and accounts are keyed by this form
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Check if an (already normalized or raw) address is well formed
pub fn is_valid_email(email: &str) -> bool {
    let email = email.trim();
    email.len() <= MAX_EMAIL_LENGTH && EMAIL_REGEX.is_match(email)
}

/// Mask an address for logging (e.g., j***@example.com)
pub fn mask_email(email: &str) -> String {
    match email.split_once('@') {
        Some((local, domain)) => {
            let first = local.chars().next().map(String::from).unwrap_or_default();
            format!("{}***@{}", first, domain)
        }
        None => "***".to_string(),
    }
}

/// Name to greet someone by when no display name is on record
pub fn fallback_display_name(email: &str) -> String {
    email
        .split_once('@')
        .map(|(local, _)| local)
        .filter(|local| !local.is_empty())
        .unwrap_or("there")
        .to_string()
}
