use std::sync::LazyLock;

use regex::Regex;

use super::IntakeError;

// Deliberately loose: something, an @, something, a dot, something.
static EMAIL_SHAPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\S+@\S+\.\S+$").expect("Invalid email pattern"));

/// Trim and lowercase an address, rejecting empty or malformed input.
pub fn normalize_email(raw: &str) -> Result<String, IntakeError> {
    if raw.is_empty() {
        return Err(IntakeError::Validation("Email is required".to_string()));
    }

    // Whitespace-only input falls through to the shape check
    let normalized = raw.trim().to_lowercase();
    if !EMAIL_SHAPE.is_match(&normalized) {
        return Err(IntakeError::Validation(
            "Invalid email address".to_string(),
        ));
    }

    Ok(normalized)
}
