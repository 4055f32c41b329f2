use validator::ValidationError;

/// Rejects strings that are empty after trimming.
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut error = ValidationError::new("is_required");
        error.message = Some(std::borrow::Cow::from("This field is required"));
        Err(error)
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_values_fail() {
        assert!(validate_not_blank("").is_err());
        assert!(validate_not_blank("   \t").is_err());
        assert!(validate_not_blank(" ok ").is_ok());
    }
}
