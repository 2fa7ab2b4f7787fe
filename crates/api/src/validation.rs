//! Boundary validation for request fields.
//!
//! These checks run in route handlers before any core operation; the core
//! components never see malformed input. Email structure is handled by
//! [`storepulse_core::Email`] and the rating range by
//! [`storepulse_core::RatingValue`].

/// Minimum display-name length.
pub const NAME_MIN: usize = 20;
/// Maximum display-name length.
pub const NAME_MAX: usize = 60;
/// Maximum address length.
pub const ADDRESS_MAX: usize = 400;
/// Minimum password length.
pub const PASSWORD_MIN: usize = 8;
/// Maximum password length.
pub const PASSWORD_MAX: usize = 16;

const PASSWORD_SPECIALS: &str = "!@#$%^&*";

/// Validate a user or store display name.
///
/// # Errors
///
/// Returns a human-readable message when the trimmed name is outside
/// 20-60 characters.
pub fn validate_name(name: &str) -> Result<(), String> {
    let len = name.trim().chars().count();
    if len < NAME_MIN || len > NAME_MAX {
        return Err(format!(
            "Name must be between {NAME_MIN} and {NAME_MAX} characters"
        ));
    }
    Ok(())
}

/// Validate an optional address.
///
/// # Errors
///
/// Returns a human-readable message when the address exceeds 400 characters.
pub fn validate_address(address: Option<&str>) -> Result<(), String> {
    if let Some(address) = address
        && address.chars().count() > ADDRESS_MAX
    {
        return Err(format!("Address must not exceed {ADDRESS_MAX} characters"));
    }
    Ok(())
}

/// Validate password strength: 8-16 characters with at least one uppercase
/// letter and one of `!@#$%^&*`.
///
/// # Errors
///
/// Returns a human-readable message describing the first failed rule.
pub fn validate_password(password: &str) -> Result<(), String> {
    let len = password.chars().count();
    if len < PASSWORD_MIN || len > PASSWORD_MAX {
        return Err(format!(
            "Password must be between {PASSWORD_MIN} and {PASSWORD_MAX} characters"
        ));
    }
    if !password.chars().any(char::is_uppercase) {
        return Err("Password must contain at least one uppercase letter".to_owned());
    }
    if !password.chars().any(|c| PASSWORD_SPECIALS.contains(c)) {
        return Err(format!(
            "Password must contain at least one special character ({PASSWORD_SPECIALS})"
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_bounds() {
        assert!(validate_name("Johnathan Maxwell Sterling III").is_ok());
        assert!(validate_name("short name").is_err());
        assert!(validate_name(&"x".repeat(61)).is_err());
        // Trimmed padding doesn't count toward the length.
        assert!(validate_name(&format!("  {}  ", "x".repeat(20))).is_ok());
    }

    #[test]
    fn test_address_bounds() {
        assert!(validate_address(None).is_ok());
        assert!(validate_address(Some("12 Elm Street")).is_ok());
        assert!(validate_address(Some(&"a".repeat(401))).is_err());
    }

    #[test]
    fn test_password_rules() {
        assert!(validate_password("Valid@123").is_ok());
        assert!(validate_password("short").is_err());
        assert!(validate_password("toolongpassword12345@A").is_err());
        assert!(validate_password("noupper@123").is_err());
        assert!(validate_password("NoSpecial123").is_err());
    }
}
