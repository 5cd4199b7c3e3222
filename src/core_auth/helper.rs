use bcrypt::{hash, verify, BcryptError, DEFAULT_COST};

/// Hashes a password for the configuration file (`--hash-password`).
pub fn hash_password(password: &str) -> Result<String, BcryptError> {
    hash_password_with_cost(password, DEFAULT_COST)
}

pub fn hash_password_with_cost(password: &str, cost: u32) -> Result<String, BcryptError> {
    hash(password, cost)
}

pub fn is_bcrypt_hash(stored: &str) -> bool {
    stored.starts_with("$2") && stored.len() == 60
}

/// Compares a supplied password with the stored value, which may be either
/// cleartext or a bcrypt hash.
pub fn verify_password(password: &str, stored: &str) -> bool {
    if is_bcrypt_hash(stored) {
        verify(password, stored).unwrap_or(false)
    } else {
        constant_time_eq(password.as_bytes(), stored.as_bytes())
    }
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
