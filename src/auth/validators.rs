use once_cell::sync::Lazy;
use regex::Regex;

static USERNAME_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[\w.@+-]+$").unwrap());
static SLUG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[-a-zA-Z0-9_]+$").unwrap());

pub const USERNAME_MAX_CHARS: usize = 150;
pub const SLUG_MAX_CHARS: usize = 30;

/// Letters, digits and `@.+-_`, at most 150 characters.
pub fn validate_username(username: &str) -> Result<(), String> {
    if username.is_empty() {
        return Err("This field is required.".to_string());
    }
    if username.chars().count() > USERNAME_MAX_CHARS {
        return Err(format!(
            "Ensure this value has at most {USERNAME_MAX_CHARS} characters."
        ));
    }
    if !USERNAME_RE.is_match(username) {
        return Err(
            "Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters."
                .to_string(),
        );
    }
    Ok(())
}

/// ASCII letters, digits, hyphens and underscores, at most 30 characters.
pub fn validate_slug(slug: &str) -> Result<(), String> {
    if slug.is_empty() {
        return Err("This field is required.".to_string());
    }
    if slug.chars().count() > SLUG_MAX_CHARS {
        return Err(format!("Ensure this value has at most {SLUG_MAX_CHARS} characters."));
    }
    if !SLUG_RE.is_match(slug) {
        return Err(
            "Enter a valid slug consisting of letters, numbers, underscores or hyphens."
                .to_string(),
        );
    }
    Ok(())
}
