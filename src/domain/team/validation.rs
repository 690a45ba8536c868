//! Team validation

use thiserror::Error;

/// Errors that can occur during team validation
#[derive(Debug, Error, Clone, PartialEq)]
pub enum TeamValidationError {
    #[error("Team name cannot be empty")]
    EmptyName,

    #[error("Team name cannot exceed {0} characters")]
    NameTooLong(usize),

    #[error("Team description cannot exceed {0} characters")]
    DescriptionTooLong(usize),
}

const MAX_TEAM_NAME_LENGTH: usize = 255;
const MAX_TEAM_DESCRIPTION_LENGTH: usize = 2000;

/// Validate a team name
pub fn validate_team_name(name: &str) -> Result<(), TeamValidationError> {
    if name.trim().is_empty() {
        return Err(TeamValidationError::EmptyName);
    }

    if name.len() > MAX_TEAM_NAME_LENGTH {
        return Err(TeamValidationError::NameTooLong(MAX_TEAM_NAME_LENGTH));
    }

    Ok(())
}

/// Validate a team description
pub fn validate_team_description(description: &str) -> Result<(), TeamValidationError> {
    if description.len() > MAX_TEAM_DESCRIPTION_LENGTH {
        return Err(TeamValidationError::DescriptionTooLong(
            MAX_TEAM_DESCRIPTION_LENGTH,
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_team_name() {
        assert!(validate_team_name("Climate Action Group").is_ok());
        assert!(validate_team_name("SDG 13 & 14!").is_ok());
    }

    #[test]
    fn test_empty_team_name() {
        assert_eq!(validate_team_name(""), Err(TeamValidationError::EmptyName));
        assert_eq!(
            validate_team_name("   "),
            Err(TeamValidationError::EmptyName)
        );
    }

    #[test]
    fn test_team_name_too_long() {
        let long_name = "a".repeat(256);
        assert_eq!(
            validate_team_name(&long_name),
            Err(TeamValidationError::NameTooLong(255))
        );
    }

    #[test]
    fn test_description_length() {
        assert!(validate_team_description("").is_ok());
        assert!(validate_team_description("short").is_ok());

        let long = "d".repeat(2001);
        assert_eq!(
            validate_team_description(&long),
            Err(TeamValidationError::DescriptionTooLong(2000))
        );
    }
}
