use lazy_static::lazy_static;
use regex::Regex;

/// A field-level input problem, reported to the client verbatim.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct ValidationError(pub String);

impl ValidationError {
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }
}

pub type Checked = Result<(), ValidationError>;

pub fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex =
            Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email regex is valid");
    }
    EMAIL_RE.is_match(email)
}

/// Required text: non-blank after trimming and at most `max` characters.
pub fn required(field: &str, value: &str, max: usize) -> Checked {
    if value.trim().is_empty() {
        return Err(ValidationError(format!("{} is required", field)));
    }
    max_len(field, Some(value), max)
}

pub fn max_len(field: &str, value: Option<&str>, max: usize) -> Checked {
    match value {
        Some(v) if v.chars().count() > max => Err(ValidationError(format!(
            "{} cannot exceed {} characters",
            field, max
        ))),
        _ => Ok(()),
    }
}

/// A present title in a patch must still satisfy the required-text rule.
pub fn required_if_present(field: &str, value: Option<&str>, max: usize) -> Checked {
    match value {
        Some(v) => required(field, v, max),
        None => Ok(()),
    }
}

pub fn in_range<T>(field: &str, value: Option<T>, min: T, max: T) -> Checked
where
    T: PartialOrd + std::fmt::Display + Copy,
{
    match value {
        Some(v) if v < min || v > max => Err(ValidationError(format!(
            "{} must be between {} and {}",
            field, min, max
        ))),
        _ => Ok(()),
    }
}

pub fn at_least<T>(field: &str, value: Option<T>, min: T) -> Checked
where
    T: PartialOrd + std::fmt::Display + Copy,
{
    match value {
        Some(v) if v < min => Err(ValidationError(format!(
            "{} must be at least {}",
            field, min
        ))),
        _ => Ok(()),
    }
}
