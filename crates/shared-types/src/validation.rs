//! # Validation Helpers
//!
//! Email normalization and slug generation shared by catalog, checkout,
//! newsletter and reviews.

use crate::errors::ValidationError;

/// Maximum length of an email address (RFC 5321 path limit).
pub const MAX_EMAIL_LEN: usize = 254;

/// Trim, lowercase and sanity-check an email address.
///
/// This is intentionally shallow: one `@`, a non-empty local part, a dotted
/// domain without empty labels, and no whitespace. Deliverability is the
/// mail provider's problem.
pub fn normalize_email(raw: &str) -> Result<String, ValidationError> {
    let email = raw.trim().to_lowercase();
    if email.is_empty() {
        return Err(ValidationError::Required("email"));
    }
    if email.len() > MAX_EMAIL_LEN {
        return Err(ValidationError::TooLong {
            field: "email",
            max: MAX_EMAIL_LEN,
        });
    }
    if email.chars().any(char::is_whitespace) {
        return Err(ValidationError::InvalidEmail(email));
    }

    let mut parts = email.split('@');
    let (Some(local), Some(domain), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(ValidationError::InvalidEmail(email));
    };
    if local.is_empty() || !domain.contains('.') || domain.split('.').any(str::is_empty) {
        return Err(ValidationError::InvalidEmail(email));
    }

    Ok(email)
}

/// Build a URL slug: lowercase ASCII alphanumerics separated by single `-`.
#[must_use]
pub fn slugify(input: &str) -> String {
    let mut slug = String::with_capacity(input.len());
    let mut pending_dash = false;

    for ch in input.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(ch.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }

    slug
}
