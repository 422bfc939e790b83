// Validation utilities module
// Provides custom validation functions for domain-specific rules

use validator::ValidationError;

/// Validates that a gender value is one of the accepted values
/// Valid values: "male", "female", "other" (case-insensitive)
pub fn validate_gender(gender: &str) -> Result<(), ValidationError> {
    let valid = ["male", "female", "other"];
    if valid.contains(&gender.to_lowercase().as_str()) {
        Ok(())
    } else {
        Err(ValidationError::new("invalid_gender"))
    }
}

/// Validates a phone number: optional leading +, then at least ten
/// digits/spaces/dashes
pub fn validate_phone(phone: &str) -> Result<(), ValidationError> {
    let pattern = regex::Regex::new(r"^\+?[\d\s-]{10,}$").expect("phone regex is valid");
    if pattern.is_match(phone) {
        Ok(())
    } else {
        Err(ValidationError::new("invalid_phone"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_genders() {
        assert!(validate_gender("male").is_ok());
        assert!(validate_gender("Female").is_ok());
        assert!(validate_gender("OTHER").is_ok());
    }

    #[test]
    fn test_invalid_gender() {
        assert!(validate_gender("unknown").is_err());
        assert!(validate_gender("").is_err());
    }

    #[test]
    fn test_valid_phone_numbers() {
        assert!(validate_phone("+1 555-123-4567").is_ok());
        assert!(validate_phone("01234567890").is_ok());
    }

    #[test]
    fn test_invalid_phone_numbers() {
        assert!(validate_phone("12345").is_err());
        assert!(validate_phone("not-a-number").is_err());
    }
}
