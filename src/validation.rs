// Field-level rules shared by every draft
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt::Display;

use crate::error::ValidationError;

static MOBILE_NUMBER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]{10}$").expect("valid regex"));
static OTP: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]{4,6}$").expect("valid regex"));

pub fn required(errors: &mut ValidationError, field: &str, value: &str) {
    if value.trim().is_empty() {
        errors.add(field, "This field is required");
    }
}

pub fn mobile_number(errors: &mut ValidationError, field: &str, value: &str) {
    required(errors, field, value);
    if !value.trim().is_empty() && !MOBILE_NUMBER.is_match(value) {
        errors.add(field, "Must be a 10-digit mobile number");
    }
}

pub fn otp(errors: &mut ValidationError, field: &str, value: &str) {
    required(errors, field, value);
    if !value.trim().is_empty() && !OTP.is_match(value) {
        errors.add(field, "Must be a 4 to 6 digit code");
    }
}

pub fn range<T: PartialOrd + Display>(errors: &mut ValidationError, field: &str, value: T, min: T, max: T) {
    if value < min || value > max {
        errors.add(field, format!("Must be between {} and {}", min, max));
    }
}

pub fn at_least<T: PartialOrd + Display>(errors: &mut ValidationError, field: &str, value: T, min: T) {
    if value < min {
        errors.add(field, format!("Must be at least {}", min));
    }
}
