//! Input validation functions
//!
//! Request shapes are validated with the `validator` derive macros in
//! [`crate::types`]; this module holds the normalisation and the checks
//! that do not fit a derive attribute.

use std::borrow::Cow;
use validator::{ValidationError, ValidationErrors};

/// Image file extensions accepted for book covers and avatars
pub const ALLOWED_IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp"];

/// Largest page returned by the book pagination endpoint
pub const MAX_PAGE_SIZE: u32 = 100;

/// Maximum length of book names and authors
pub const MAX_BOOK_FIELD_LEN: usize = 255;

/// Maximum length of a profile bio
pub const MAX_BIO_LEN: usize = 2000;

/// bcrypt only reads this many bytes of a password; anything longer is refused
pub const MAX_PASSWORD_BYTES: usize = 72;

/// Canonical form of an email address for storage and lookup
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Canonical form of a username
pub fn normalize_username(username: &str) -> String {
    username.trim().to_string()
}

/// Flatten `validator` errors into a single deterministic message
///
/// Fields are sorted by name so the same input always yields the same text.
pub fn describe_validation_errors(errors: &ValidationErrors) -> String {
    let mut parts: Vec<String> = errors
        .field_errors()
        .into_iter()
        .map(|(field, errs)| {
            let reason = errs
                .first()
                .and_then(|e| e.message.as_ref().map(|m| m.to_string()))
                .unwrap_or_else(|| "is invalid".to_string());
            format!("{}: {}", field, reason)
        })
        .collect();
    parts.sort();
    parts.join("; ")
}

/// Reject passwords bcrypt would truncate. The limit is in bytes, not characters.
pub fn validate_password_bytes(password: &str) -> Result<(), ValidationError> {
    if password.len() > MAX_PASSWORD_BYTES {
        let mut err = ValidationError::new("password_too_long");
        err.message = Some(Cow::from("must be at most 72 bytes"));
        return Err(err);
    }
    Ok(())
}

/// Validate a required book text field (name or author)
pub fn validate_book_field(label: &str, value: &str) -> Result<(), String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(format!("{} is required", label));
    }
    if trimmed.chars().count() > MAX_BOOK_FIELD_LEN {
        return Err(format!(
            "{} must be at most {} characters",
            label, MAX_BOOK_FIELD_LEN
        ));
    }
    Ok(())
}

/// Validate a profile bio
pub fn validate_bio(bio: &str) -> Result<(), String> {
    if bio.chars().count() > MAX_BIO_LEN {
        return Err(format!("bio must be at most {} characters", MAX_BIO_LEN));
    }
    Ok(())
}

/// Lower-cased extension of an uploaded image, if it is on the allow-list
pub fn image_extension(filename: &str) -> Option<String> {
    let (stem, ext) = filename.rsplit_once('.')?;
    if stem.is_empty() {
        return None;
    }
    let ext = ext.to_ascii_lowercase();
    ALLOWED_IMAGE_EXTENSIONS
        .contains(&ext.as_str())
        .then_some(ext)
}

/// Clamp a requested page size to `1..=MAX_PAGE_SIZE`
pub fn clamp_page_size(count: u32) -> u32 {
    count.clamp(1, MAX_PAGE_SIZE)
}
