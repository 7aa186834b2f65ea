use crate::error::{Error, Result};

pub const MIN_PASSWORD_LEN: usize = 6;
pub const MAX_PERSON_NAME_LEN: usize = 50;
pub const MAX_CHANNEL_NAME_LEN: usize = 20;
pub const MIN_HANDLE_LEN: usize = 3;
pub const MAX_HANDLE_LEN: usize = 20;
pub const MAX_MESSAGE_LEN: usize = 1000;

fn char_len(s: &str) -> usize {
    s.chars().count()
}

fn validate_length(value: &str, entity: &str, min: usize, max: usize) -> Result<()> {
    let len = char_len(value);
    if len < min || len > max {
        return Err(Error::invalid(format!(
            "{entity} must be between {min} and {max} characters"
        )));
    }
    Ok(())
}

pub fn validate_person_name(name: &str, entity: &str) -> Result<()> {
    validate_length(name, entity, 1, MAX_PERSON_NAME_LEN)
}

pub fn validate_channel_name(name: &str) -> Result<()> {
    validate_length(name, "Channel name", 1, MAX_CHANNEL_NAME_LEN)
}

pub fn validate_password(password: &str) -> Result<()> {
    if char_len(password) < MIN_PASSWORD_LEN {
        return Err(Error::invalid(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}

/// Body of a message sent, scheduled, or shared as a new message.
pub fn validate_message_body(body: &str) -> Result<()> {
    validate_length(body, "Message", 1, MAX_MESSAGE_LEN)
}

/// Upper bound only: edits may empty a message and standup lines may be blank.
pub fn validate_message_max(body: &str) -> Result<()> {
    if char_len(body) > MAX_MESSAGE_LEN {
        return Err(Error::invalid(format!(
            "Message cannot exceed {MAX_MESSAGE_LEN} characters"
        )));
    }
    Ok(())
}

pub fn validate_handle(handle: &str) -> Result<()> {
    validate_length(handle, "Handle", MIN_HANDLE_LEN, MAX_HANDLE_LEN)?;
    if !handle.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(Error::invalid(
            "Handle can only contain alphanumeric characters",
        ));
    }
    Ok(())
}

pub fn validate_email(email: &str) -> Result<()> {
    let invalid = || Error::invalid("Invalid email address");

    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
    if local.is_empty() || local.chars().any(char::is_whitespace) || domain.contains('@') {
        return Err(invalid());
    }

    let labels: Vec<&str> = domain.split('.').collect();
    if labels.len() < 2 {
        return Err(invalid());
    }
    let label_ok =
        |l: &&str| !l.is_empty() && l.chars().all(|c| c.is_ascii_alphanumeric() || c == '-');
    if !labels.iter().all(label_ok) {
        return Err(invalid());
    }
    Ok(())
}

/// Derives the base handle from a user's names: ASCII alphanumerics only,
/// lowercased, at most 20 characters.
#[must_use]
pub fn handle_base(name_first: &str, name_last: &str) -> String {
    name_first
        .chars()
        .chain(name_last.chars())
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_lowercase())
        .take(MAX_HANDLE_LEN)
        .collect()
}
