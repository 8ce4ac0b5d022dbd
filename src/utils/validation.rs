//! Input validation utilities

use once_cell::sync::Lazy;
use regex::Regex;

/// Loose RFC 5322 address check; the mail server is the final authority
static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+\-]+@[A-Za-z0-9\-]+(\.[A-Za-z0-9\-]+)*\.[A-Za-z]{2,}$").unwrap()
});

/// National identity numbers are digits, optionally with a check letter
static NATIONAL_ID_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]{5,12}[A-Za-z]?$").unwrap());

static PHONE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\+?[0-9][0-9\- ]{5,19}$").unwrap());

/// Validate an email address
pub fn validate_email(email: &str) -> bool {
    email.len() <= 254 && EMAIL_REGEX.is_match(email)
}

/// Validate a national identity number
pub fn validate_national_id(national_id: &str) -> bool {
    NATIONAL_ID_REGEX.is_match(national_id)
}

/// Validate a phone number
pub fn validate_phone(phone: &str) -> bool {
    PHONE_REGEX.is_match(phone)
}
