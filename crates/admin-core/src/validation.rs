//! Input validation rules shared by the request types

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::Regex;
use validator::{ValidationError, ValidationErrors};

// Dialable number after separators are stripped: optional +, 7 to 15 digits
static PHONE_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\+?[1-9][0-9]{6,14}$").unwrap());

const MAX_SKILLS: usize = 32;
const MAX_SKILL_LEN: usize = 50;

/// Reject empty or whitespace-only text
pub fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

/// Validate a phone number, tolerating common visual separators
pub fn validate_phone(phone: &str) -> Result<(), ValidationError> {
    let compact: String = phone
        .chars()
        .filter(|c| !matches!(c, ' ' | '-' | '(' | ')' | '.'))
        .collect();

    if compact.is_empty() {
        return Err(ValidationError::new("phone_empty").with_message("Phone is required".into()));
    }

    if !PHONE_REGEX.is_match(&compact) {
        return Err(ValidationError::new("invalid_phone_format")
            .with_message(format!("'{}' is not a valid phone number", phone).into()));
    }

    Ok(())
}

/// Validate skill tags
pub fn validate_skills(skills: &Vec<String>) -> Result<(), ValidationError> {
    if skills.len() > MAX_SKILLS {
        return Err(ValidationError::new("too_many_skills")
            .with_message(format!("At most {} skills are allowed", MAX_SKILLS).into()));
    }

    for skill in skills {
        if skill.trim().chars().count() > MAX_SKILL_LEN {
            return Err(ValidationError::new("skill_too_long")
                .with_message(format!("Skills must not exceed {} characters", MAX_SKILL_LEN).into()));
        }
        if skill.contains('<') || skill.contains('>') {
            return Err(ValidationError::new("skill_invalid_chars")
                .with_message("Skills must not contain markup".into()));
        }
    }

    Ok(())
}

/// Trim skill tags, drop blanks and collapse duplicates keeping first occurrence
pub fn normalize_skills(skills: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(skills.len());
    for skill in skills {
        let skill = skill.trim();
        if !skill.is_empty() && !out.iter().any(|s| s == skill) {
            out.push(skill.to_string());
        }
    }
    out
}

/// Flatten validator output into one human-readable message.
///
/// Fields are reported in name order so messages are stable.
pub fn describe(errors: &ValidationErrors) -> String {
    let fields: BTreeMap<_, _> = errors.field_errors().into_iter().collect();

    let mut messages = Vec::new();
    for (field, errs) in fields {
        for err in errs.iter() {
            match &err.message {
                Some(message) => messages.push(message.to_string()),
                None => messages.push(format!("{} is invalid ({})", field, err.code)),
            }
        }
    }

    if messages.is_empty() {
        "Invalid request".to_string()
    } else {
        messages.dedup();
        messages.join("; ")
    }
}
