//! Input validation for external reviewer submissions

use regex::Regex;
use std::sync::OnceLock;

/// Validate the reviewer name
pub fn validate_reviewer_name(name: &str) -> Result<(), String> {
    let name = name.trim();
    if name.is_empty() {
        return Err("Reviewer name is required".to_string());
    }

    if name.len() > 120 {
        return Err("Reviewer name must be at most 120 characters long".to_string());
    }

    Ok(())
}

/// Validate the reviewer email
pub fn validate_reviewer_email(email: &str) -> Result<(), String> {
    if email.is_empty() {
        return Err("Reviewer email is required".to_string());
    }

    if email.len() > 254 {
        return Err("Reviewer email must be at most 254 characters long".to_string());
    }

    static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = EMAIL_REGEX.get_or_init(|| {
        Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$")
            .expect("Failed to compile email regex")
    });

    if !regex.is_match(email) {
        return Err("Invalid reviewer email format".to_string());
    }

    Ok(())
}

/// Validate the rejection note that must accompany a reject decision
pub fn validate_rejection_note(note: &str) -> Result<(), String> {
    let note = note.trim();
    if note.is_empty() {
        return Err("A rejection note is required when rejecting".to_string());
    }

    if note.len() > 2000 {
        return Err("Rejection note must be at most 2000 characters long".to_string());
    }

    Ok(())
}
