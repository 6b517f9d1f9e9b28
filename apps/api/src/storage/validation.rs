use thiserror::Error;

use crate::models::resume::ResumeDocument;

/// Reasons an explicit save is refused. Nothing is persisted when one occurs.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Please enter your name")]
    MissingName,

    #[error("Please enter your email")]
    MissingEmail,
}

/// Name first, then email: the first missing field is reported.
pub fn validate_for_save(doc: &ResumeDocument) -> Result<(), ValidationError> {
    if doc.personal_info.name.trim().is_empty() {
        return Err(ValidationError::MissingName);
    }
    if doc.personal_info.email.trim().is_empty() {
        return Err(ValidationError::MissingEmail);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::resume::empty_document;

    #[test]
    fn test_missing_name() {
        let mut doc = empty_document();
        doc.personal_info.email = "x@y.com".into();
        assert_eq!(validate_for_save(&doc), Err(ValidationError::MissingName));
    }

    #[test]
    fn test_missing_email() {
        let mut doc = empty_document();
        doc.personal_info.name = "Ada".into();
        doc.personal_info.email = "  ".into();
        assert_eq!(validate_for_save(&doc), Err(ValidationError::MissingEmail));
    }

    #[test]
    fn test_valid() {
        let mut doc = empty_document();
        doc.personal_info.name = "Ada".into();
        doc.personal_info.email = "ada@example.com".into();
        assert_eq!(validate_for_save(&doc), Ok(()));
    }
}
