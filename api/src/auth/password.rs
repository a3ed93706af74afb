use std::sync::OnceLock;

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

/// Hash a plaintext password into an argon2 PHC string.
pub fn hash(plain: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(plain.as_bytes(), &salt)?
        .to_string();
    Ok(hash)
}

/// `true` only if `plain` matches `hash`. An unparsable stored hash counts as
/// a mismatch.
pub fn verify(plain: &str, hash: &str) -> bool {
    let Ok(parsed_hash) = PasswordHash::new(hash) else {
        tracing::warn!("stored password hash is not a valid PHC string");
        return false;
    };
    Argon2::default()
        .verify_password(plain.as_bytes(), &parsed_hash)
        .is_ok()
}

/// Spend the same argon2 work as a real [`verify`] when there is no stored
/// hash to check against, so unknown usernames answer as slowly as wrong
/// passwords.
pub fn verify_dummy(plain: &str) {
    if let Some(dummy) = dummy_hash() {
        let _ = verify(plain, dummy);
    }
}

fn dummy_hash() -> Option<&'static str> {
    static DUMMY_HASH: OnceLock<Option<String>> = OnceLock::new();
    DUMMY_HASH
        .get_or_init(|| hash("not-a-real-password").ok())
        .as_deref()
}
