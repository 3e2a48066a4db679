//! Add-reading form model.

use serde::Serialize;
use std::fmt;

use crate::entities::CreateReadingRequest;

/// Per-field validation messages
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FormErrors {
    pub systolic: Option<String>,
    pub diastolic: Option<String>,
}

impl FormErrors {
    pub fn is_empty(&self) -> bool {
        self.systolic.is_none() && self.diastolic.is_none()
    }
}

impl fmt::Display for FormErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<&str> = [&self.systolic, &self.diastolic]
            .into_iter()
            .flatten()
            .map(String::as_str)
            .collect();
        write!(f, "{}", messages.join("; "))
    }
}

/// Raw text of the two numeric inputs
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReadingForm {
    pub systolic: String,
    pub diastolic: String,
}

impl ReadingForm {
    pub fn new(systolic: impl Into<String>, diastolic: impl Into<String>) -> Self {
        Self {
            systolic: systolic.into(),
            diastolic: diastolic.into(),
        }
    }

    /// Validate both fields and build the create request
    pub fn validate(&self) -> Result<CreateReadingRequest, FormErrors> {
        let systolic = parse_field("Systolic", &self.systolic);
        let diastolic = parse_field("Diastolic", &self.diastolic);

        match (systolic, diastolic) {
            (Ok(systolic), Ok(diastolic)) => Ok(CreateReadingRequest { systolic, diastolic }),
            (systolic, diastolic) => Err(FormErrors {
                systolic: systolic.err(),
                diastolic: diastolic.err(),
            }),
        }
    }

    /// Clear both inputs after a successful submit
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

fn parse_field(name: &str, raw: &str) -> Result<i32, String> {
    let raw = raw.trim();
    let value: i32 = match raw.parse() {
        Ok(value) => value,
        // Readings are stored as integers
        Err(_) if raw.parse::<f64>().map_or(false, f64::is_finite) => {
            return Err(format!("{} must be a whole number", name));
        }
        Err(_) => return Err(format!("{} is Required", name)),
    };

    if value <= 0 {
        return Err(format!("{} must be greater than Zero", name));
    }
    Ok(value)
}

/// Progress notices shown while a reading is submitted
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitNotice {
    Pending,
    Added,
    Failed(String),
}

impl SubmitNotice {
    pub fn message(&self) -> String {
        match self {
            SubmitNotice::Pending => "Adding BP Reading...".to_string(),
            SubmitNotice::Added => "Added BP Reading".to_string(),
            SubmitNotice::Failed(reason) => format!("Failed to add BP Reading: {}", reason),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_form() {
        let form = ReadingForm::new(" 130", "85 ");
        assert_eq!(
            form.validate().unwrap(),
            CreateReadingRequest { systolic: 130, diastolic: 85 }
        );
    }

    #[test]
    fn test_blank_and_non_numeric_are_required() {
        let errors = ReadingForm::new("", "abc").validate().unwrap_err();
        assert_eq!(errors.systolic.as_deref(), Some("Systolic is Required"));
        assert_eq!(errors.diastolic.as_deref(), Some("Diastolic is Required"));
    }

    #[test]
    fn test_decimals_are_not_whole_numbers() {
        let errors = ReadingForm::new("120.5", "80").validate().unwrap_err();
        assert_eq!(errors.systolic.as_deref(), Some("Systolic must be a whole number"));
        assert_eq!(errors.diastolic, None);

        let errors = ReadingForm::new("120", "79.9").validate().unwrap_err();
        assert_eq!(errors.diastolic.as_deref(), Some("Diastolic must be a whole number"));

        let errors = ReadingForm::new("NaN", "inf").validate().unwrap_err();
        assert_eq!(errors.systolic.as_deref(), Some("Systolic is Required"));
        assert_eq!(errors.diastolic.as_deref(), Some("Diastolic is Required"));
    }

    #[test]
    fn test_non_positive_values() {
        let errors = ReadingForm::new("0", "80").validate().unwrap_err();
        assert_eq!(errors.systolic.as_deref(), Some("Systolic must be greater than Zero"));
        assert_eq!(errors.diastolic, None);
        assert_eq!(errors.to_string(), "Systolic must be greater than Zero");

        let errors = ReadingForm::new("120", "-1").validate().unwrap_err();
        assert_eq!(errors.diastolic.as_deref(), Some("Diastolic must be greater than Zero"));
    }

    #[test]
    fn test_reset_clears_inputs() {
        let mut form = ReadingForm::new("120", "80");
        form.reset();
        assert_eq!(form, ReadingForm::default());
    }

    #[test]
    fn test_notice_messages() {
        assert_eq!(SubmitNotice::Pending.message(), "Adding BP Reading...");
        assert_eq!(SubmitNotice::Added.message(), "Added BP Reading");
        assert_eq!(
            SubmitNotice::Failed("timeout".to_string()).message(),
            "Failed to add BP Reading: timeout"
        );
    }
}
