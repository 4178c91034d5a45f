use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use rand::rngs::OsRng;

/// Minimum length for a newly chosen password.
pub const MIN_PASSWORD_LEN: usize = 6;

/// Hash a password using `Argon2id`.
///
/// # Errors
///
/// Returns an error if hashing fails.
pub fn hash_password(password: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("Failed to hash password: {e}"))?;
    Ok(hash.to_string())
}

/// Verify a password against an `Argon2id` hash.
///
/// Returns `true` if the password matches, `false` otherwise.
///
/// # Errors
///
/// Returns an error if the hash format is invalid.
pub fn verify_password(password: &str, hash: &str) -> anyhow::Result<bool> {
    let parsed_hash =
        PasswordHash::new(hash).map_err(|e| anyhow::anyhow!("Invalid password hash: {e}"))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

/// Validate a newly chosen password: at least 6 and at most 128 characters.
///
/// # Errors
///
/// Returns a descriptive error message if validation fails.
pub fn validate_new_password(password: &str) -> Result<(), String> {
    let len = password.chars().count();
    if len < MIN_PASSWORD_LEN {
        return Err(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters."
        ));
    }
    if len > 128 {
        return Err("Password must be at most 128 characters.".to_string());
    }
    Ok(())
}

/// Validate email format (one `@`, non-empty local part, dotted domain, no whitespace).
///
/// # Errors
///
/// Returns a descriptive error message if the email is invalid.
pub fn validate_email(email: &str) -> Result<(), String> {
    if email.is_empty() {
        return Err("Email is required.".to_string());
    }
    if email.chars().any(char::is_whitespace) {
        return Err("Invalid email format.".to_string());
    }
    let Some((local, domain)) = email.split_once('@') else {
        return Err("Invalid email format.".to_string());
    };
    let domain_ok = !domain.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.');
    if local.is_empty() || !domain_ok {
        return Err("Invalid email format.".to_string());
    }
    Ok(())
}

/// Normalize an email for lookups and storage.
#[must_use]
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
