use thiserror::Error;

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Content is required")]
    EmptyContent,

    #[error("Content too long: {actual} chars (max: {max})")]
    ContentTooLong { actual: usize, max: usize },

    #[error("{0} is required")]
    MissingField(String),
}

/// Validates journal content before it is written to the sheet.
#[derive(Clone)]
pub struct ContentValidator {
    max_content_length: usize,
}

impl ContentValidator {
    pub fn new(max_content_length: usize) -> Self {
        Self { max_content_length }
    }

    /// Returns the trimmed content, rejecting empty and oversized input.
    pub fn validate_content(&self, content: &str) -> Result<String, ValidationError> {
        let trimmed = content.trim();

        if trimmed.is_empty() {
            return Err(ValidationError::EmptyContent);
        }

        let length = trimmed.chars().count();
        if length > self.max_content_length {
            return Err(ValidationError::ContentTooLong {
                actual: length,
                max: self.max_content_length,
            });
        }

        Ok(trimmed.to_string())
    }
}

/// Rejects empty required fields on family records.
pub fn require_field(name: &str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::MissingField(name.to_string()))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_content() {
        let validator = ContentValidator::new(10_000);
        assert_eq!(
            validator.validate_content("  remember the dentist  ").unwrap(),
            "remember the dentist"
        );
    }

    #[test]
    fn test_empty_content() {
        let validator = ContentValidator::new(10_000);
        assert!(matches!(
            validator.validate_content(""),
            Err(ValidationError::EmptyContent)
        ));
        assert!(matches!(
            validator.validate_content("   "),
            Err(ValidationError::EmptyContent)
        ));
    }

    #[test]
    fn test_oversized_content() {
        let validator = ContentValidator::new(10_000);
        let large = "x".repeat(10_001);
        assert!(matches!(
            validator.validate_content(&large),
            Err(ValidationError::ContentTooLong { actual: 10_001, max: 10_000 })
        ));
    }

    #[test]
    fn test_boundary_length_is_accepted() {
        let validator = ContentValidator::new(10);
        assert!(validator.validate_content(&"x".repeat(10)).is_ok());
    }

    #[test]
    fn test_require_field() {
        assert!(require_field("name", "Mia").is_ok());
        assert!(matches!(
            require_field("name", "  "),
            Err(ValidationError::MissingField(f)) if f == "name"
        ));
    }
}
