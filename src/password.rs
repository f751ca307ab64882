//! Password re-entry validation

pub const MIN_PASSWORD_LENGTH: usize = 8;

#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, uniffi::Error, thiserror::Error)]
pub enum PasswordError {
    #[error("password must be at least {min} characters")]
    TooShort { min: u8 },
}

/// Returns the password for the caller to submit when it is long enough
///
/// Length is counted in characters, not bytes
pub fn validate_reentered_password(password: &str) -> Result<&str, PasswordError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(PasswordError::TooShort { min: MIN_PASSWORD_LENGTH as u8 });
    }

    Ok(password)
}

mod ffi {
    use super::PasswordError;

    #[uniffi::export(name = "validate_reentered_password")]
    fn validate_reentered_password(password: String) -> Result<String, PasswordError> {
        super::validate_reentered_password(&password)?;
        Ok(password)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_too_short() {
        assert_eq!(validate_reentered_password(""), Err(PasswordError::TooShort { min: 8 }));
        assert_eq!(validate_reentered_password("1234567"), Err(PasswordError::TooShort { min: 8 }));
    }

    #[test]
    fn test_error_message() {
        let error = PasswordError::TooShort { min: 8 };
        assert_eq!(error.to_string(), "password must be at least 8 characters");
    }

    #[test]
    fn test_valid_password_is_returned() {
        assert_eq!(validate_reentered_password("12345678"), Ok("12345678"));
        assert_eq!(validate_reentered_password("correct horse"), Ok("correct horse"));
    }

    #[test]
    fn test_length_counts_characters() {
        // 7 characters, 14 bytes
        assert!(validate_reentered_password("ééééééé").is_err());
        assert!(validate_reentered_password("éééééééé").is_ok());
    }
}
