//! Small reusable checks. Each returns the reason a value was rejected.

use std::fmt::Display;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation(pub String);

impl Violation {
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }
}

pub type Check = Result<(), Violation>;

/// Length in characters, inclusive bounds.
pub fn length(value: &str, min: usize, max: usize) -> Check {
    let len = value.chars().count();
    if len < min || len > max {
        return Err(Violation(format!(
            "length must be between {min} and {max}, got {len}"
        )));
    }
    Ok(())
}

pub fn excludes(value: &str, forbidden: &str) -> Check {
    match value.chars().find(|c| forbidden.contains(*c)) {
        Some(c) => Err(Violation(format!("must not contain '{c}'"))),
        None => Ok(()),
    }
}

pub fn range<T: PartialOrd + Display>(value: T, min: T, max: T) -> Check {
    if value < min || value > max {
        return Err(Violation(format!(
            "must be between {min} and {max}, got {value}"
        )));
    }
    Ok(())
}

pub fn one_of<T: PartialEq + Display>(value: &T, allowed: &[T]) -> Check {
    if allowed.contains(value) {
        return Ok(());
    }
    Err(Violation(format!("{value} is not an allowed value")))
}

pub fn each<T>(values: &[T], check: impl Fn(&T) -> Check) -> Check {
    for (index, value) in values.iter().enumerate() {
        check(value).map_err(|v| Violation(format!("[{index}] {}", v.0)))?;
    }
    Ok(())
}

/// Identifier references: non-empty, bounded, alphanumeric with '-' or '_'.
pub fn id(value: &str) -> Check {
    length(value, 1, 64)?;
    if !value
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(Violation::new("must be an identifier"));
    }
    Ok(())
}

/// Loose address check: one '@' with a non-empty local part and a dotted domain.
pub fn email(value: &str) -> Check {
    let Some((local, domain)) = value.split_once('@') else {
        return Err(Violation::new("must be an email address"));
    };
    let domain_ok = !domain.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.');
    if local.is_empty() || !domain_ok || value.chars().any(char::is_whitespace) {
        return Err(Violation::new("must be an email address"));
    }
    Ok(())
}
