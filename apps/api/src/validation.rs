use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::errors::AppError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

/// Accepts `local@domain.tld` with no whitespace.
pub fn is_valid_email(value: &str) -> bool {
    let value = value.trim();
    if value.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && domain.split('.').all(|part| !part.is_empty())
}

/// 9–15 digits, an optional leading `+`, spaces and dashes ignored.
pub fn is_valid_phone(value: &str) -> bool {
    let compact: String = value
        .trim()
        .chars()
        .filter(|c| *c != ' ' && *c != '-')
        .collect();
    let digits = compact.strip_prefix('+').unwrap_or(&compact);
    (9..=15).contains(&digits.len()) && digits.chars().all(|c| c.is_ascii_digit())
}

/// National ID: 9 digits (old card) or 12 digits (citizen card).
pub fn is_valid_identity_number(value: &str) -> bool {
    let value = value.trim();
    matches!(value.len(), 9 | 12) && value.chars().all(|c| c.is_ascii_digit())
}

/// Collects every failing rule before reporting, like a form schema does.
#[derive(Debug, Default)]
pub struct Validator {
    errors: Vec<FieldError>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn check(&mut self, field: &str, ok: bool, message: &str) -> &mut Self {
        if !ok {
            self.errors.push(FieldError::new(field, message));
        }
        self
    }

    pub fn required(&mut self, field: &str, value: &str) -> &mut Self {
        self.check(field, !value.trim().is_empty(), "This field is required")
    }

    pub fn max_len(&mut self, field: &str, value: &str, max: usize) -> &mut Self {
        let ok = value.chars().count() <= max;
        self.check(field, ok, &format!("Must be at most {max} characters"))
    }

    pub fn email(&mut self, field: &str, value: &str) -> &mut Self {
        self.check(field, is_valid_email(value), "Email address is invalid")
    }

    pub fn phone(&mut self, field: &str, value: &str) -> &mut Self {
        self.check(field, is_valid_phone(value), "Phone number is invalid")
    }

    pub fn optional_phone(&mut self, field: &str, value: Option<&str>) -> &mut Self {
        match value.filter(|v| !v.trim().is_empty()) {
            Some(v) => self.phone(field, v),
            None => self,
        }
    }

    pub fn identity_number(&mut self, field: &str, value: &str) -> &mut Self {
        self.check(
            field,
            is_valid_identity_number(value),
            "Identity number must be 9 or 12 digits",
        )
    }

    pub fn positive(&mut self, field: &str, value: f64) -> &mut Self {
        self.check(field, value.is_finite() && value > 0.0, "Must be greater than 0")
    }

    pub fn in_range(&mut self, field: &str, value: f64, min: f64, max: f64) -> &mut Self {
        let ok = value.is_finite() && value >= min && value <= max;
        self.check(field, ok, &format!("Must be between {min} and {max}"))
    }

    pub fn date_after(
        &mut self,
        field: &str,
        start: NaiveDate,
        end: Option<NaiveDate>,
    ) -> &mut Self {
        let ok = end.map_or(true, |end| end > start);
        self.check(field, ok, "End date must be after start date")
    }

    pub fn not_in_future(&mut self, field: &str, date: NaiveDate, today: NaiveDate) -> &mut Self {
        self.check(field, date <= today, "Date cannot be in the future")
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    pub fn finish(self) -> Result<(), AppError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(AppError::InvalidFields(self.errors))
        }
    }
}
