//! Client-side form validation.
//!
//! Every rule returns `Err(message)` with the text shown to the user. Forms run
//! all of their rules through a [`FormErrors`] collector so that each violated
//! rule produces its own notification and the request is not sent.

use lazy_static::lazy_static;
use regex::Regex;

use crate::notify::Notifier;

lazy_static! {
    /// Regex for validating email addresses (local@domain.tld)
    static ref EMAIL_REGEX: Regex = Regex::new(
        r"^[A-Za-z0-9.!#$%&'*+/=?^_`{|}~-]+@[A-Za-z0-9]([A-Za-z0-9-]{0,61}[A-Za-z0-9])?(\.[A-Za-z0-9]([A-Za-z0-9-]{0,61}[A-Za-z0-9])?)*\.[A-Za-z]{2,}$"
    ).unwrap();

    /// Regex for validating integers (optional sign, digits)
    static ref INT_REGEX: Regex = Regex::new(r"^[-+]?[0-9]+$").unwrap();

    /// Regex for validating floats (e.g., 70, 70.5, .5, 1e3)
    static ref FLOAT_REGEX: Regex = Regex::new(
        r"^[-+]?([0-9]+)?(\.[0-9]*)?([eE][-+]?[0-9]+)?$"
    ).unwrap();
}

pub const NAME_MIN: usize = 3;
pub const NAME_MAX: usize = 255;
pub const PASSWORD_MIN: usize = 6;
pub const PASSWORD_MAX: usize = 50;

/// Check that `value` has between `min` and `max` characters (inclusive)
pub fn validate_length(value: &str, min: usize, max: usize, message: &str) -> Result<(), String> {
    let len = value.chars().count();
    if len < min || len > max {
        return Err(message.to_string());
    }
    Ok(())
}

pub fn validate_name(name: &str, field: &str) -> Result<(), String> {
    validate_length(
        name,
        NAME_MIN,
        NAME_MAX,
        &format!("{} must have between {} and {} chars", field, NAME_MIN, NAME_MAX),
    )
}

pub fn validate_password(password: &str) -> Result<(), String> {
    validate_length(
        password,
        PASSWORD_MIN,
        PASSWORD_MAX,
        &format!(
            "Password must have between {} and {} chars",
            PASSWORD_MIN, PASSWORD_MAX
        ),
    )
}

pub fn is_email(email: &str) -> bool {
    email.len() <= 254 && !email.contains("..") && EMAIL_REGEX.is_match(email)
}

pub fn validate_email(email: &str, message: &str) -> Result<(), String> {
    if !is_email(email) {
        return Err(message.to_string());
    }
    Ok(())
}

/// Parse a whole number typed into a form field
pub fn parse_int(value: &str) -> Option<i64> {
    let value = value.trim();
    if !INT_REGEX.is_match(value) {
        return None;
    }
    value.parse().ok()
}

/// Parse a decimal typed into a form field
pub fn parse_float(value: &str) -> Option<f64> {
    let value = value.trim();
    if matches!(value, "" | "." | "+" | "-" | "+." | "-.") || !FLOAT_REGEX.is_match(value) {
        return None;
    }
    value.parse::<f64>().ok().filter(|v| v.is_finite())
}

pub fn validate_int(value: &str, message: &str) -> Result<i64, String> {
    parse_int(value).ok_or_else(|| message.to_string())
}

pub fn validate_float(value: &str, message: &str) -> Result<f64, String> {
    parse_float(value).ok_or_else(|| message.to_string())
}

/// Collects rule violations for one form submission
#[derive(Debug, Default)]
pub struct FormErrors {
    errors: Vec<String>,
}

impl FormErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the error of a failed rule, passing the value of a passed one
    pub fn check<T>(&mut self, result: Result<T, String>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(message) => {
                self.errors.push(message);
                None
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Notify every collected error. Returns `Ok(())` if there were none.
    pub fn finish(self, notifier: &dyn Notifier) -> Result<(), Vec<String>> {
        if self.errors.is_empty() {
            return Ok(());
        }
        for message in &self.errors {
            notifier.error(message);
        }
        Err(self.errors)
    }
}
