//! Salted SHA-256 implementation of the password hashing port.
//!
//! Digests are stored as `hex(salt)$hex(sha256(salt || password))` with a
//! fresh random salt per password. Verification recomputes the digest and
//! compares in constant time; malformed stored digests behave like a
//! mismatch.

use rand::RngCore;
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

use crate::domain::ports::PasswordHasher;
use crate::domain::{Password, PasswordHash};

const SALT_LEN: usize = 16;

/// Stateless salted-SHA-256 password hasher.
#[derive(Debug, Default, Clone, Copy)]
pub struct ShaPasswordHasher;

fn digest_with_salt(salt: &[u8], password: &str) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(salt);
    hasher.update(password.as_bytes());
    hasher.finalize().into()
}

impl PasswordHasher for ShaPasswordHasher {
    fn hash(&self, password: &Password) -> PasswordHash {
        let mut salt = [0u8; SALT_LEN];
        rand::thread_rng().fill_bytes(&mut salt);
        let digest = digest_with_salt(&salt, password.expose());
        PasswordHash::new(format!("{}${}", hex::encode(salt), hex::encode(digest)))
    }

    fn verify(&self, password: &Password, stored: &PasswordHash) -> bool {
        let Some((salt_hex, digest_hex)) = stored.as_str().split_once('$') else {
            return false;
        };
        let (Ok(salt), Ok(expected)) = (hex::decode(salt_hex), hex::decode(digest_hex)) else {
            return false;
        };

        let actual = digest_with_salt(&salt, password.expose());
        bool::from(actual.as_slice().ct_eq(expected.as_slice()))
    }
}
