//! # Validation Utilities
//!
//! Input validation helpers.

/// Validate that a string is not empty.
pub fn validate_not_empty(value: &str, field_name: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        Err(format!("{} cannot be empty", field_name))
    } else {
        Ok(())
    }
}

/// Validate that a string holds no line breaks.
pub fn validate_single_line(value: &str, field_name: &str) -> Result<(), String> {
    if value.contains(['\n', '\r']) {
        Err(format!("{} must be a single line", field_name))
    } else {
        Ok(())
    }
}

/// Validate a base58 account address (must decode to 32 bytes).
pub fn validate_base58_address(address: &str) -> Result<(), String> {
    validate_not_empty(address, "Address")?;

    let bytes = bs58::decode(address.trim())
        .into_vec()
        .map_err(|e| format!("Invalid base58 address: {}", e))?;

    if bytes.len() != 32 {
        return Err(format!("Address must decode to 32 bytes, got {}", bytes.len()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base58_address() {
        assert!(validate_base58_address("So11111111111111111111111111111111111111112").is_ok());
        assert!(validate_base58_address("").is_err());
        assert!(validate_base58_address("0OIl").is_err());
        assert!(validate_base58_address("abc").is_err());
    }

    #[test]
    fn test_single_line() {
        assert!(validate_single_line("Sign in to DEX", "Statement").is_ok());
        assert!(validate_single_line("two\nlines", "Statement").is_err());
    }
}
