//! Password storage for the account directory.
//!
//! New passwords are stored as a salted PBKDF2-HMAC-SHA256 hash. Directories written by the
//! browser client hold passwords in the clear; those still verify, and `AccountDirectory`
//! replaces them with a hash after the next successful login.

use base64::engine::general_purpose::STANDARD as B64;
use base64::Engine;
use pbkdf2::pbkdf2_hmac;
use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::Sha256;

pub const DEFAULT_HASH_ITERATIONS: u32 = 100_000;
const SALT_LEN: usize = 16;
const KEY_LEN: usize = 32;

/// A stored password.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Credential {
    Hashed {
        salt: String,
        hash: String,
        iterations: u32,
    },
    /// `{ "password": "..." }`, as written by the browser client.
    Plain { password: String },
}

impl Credential {
    /// Hashes `password` with a fresh random salt.
    pub fn hash(password: &str, iterations: u32) -> Self {
        let iterations = iterations.max(1);
        let mut salt = [0u8; SALT_LEN];
        OsRng.fill_bytes(&mut salt);
        let key = derive_key(password, &salt, iterations);
        Credential::Hashed {
            salt: B64.encode(salt),
            hash: B64.encode(key),
            iterations,
        }
    }

    pub fn verify(&self, password: &str) -> bool {
        match self {
            Credential::Hashed {
                salt,
                hash,
                iterations,
            } => {
                let (Ok(salt), Ok(expected)) = (B64.decode(salt), B64.decode(hash)) else {
                    return false;
                };
                let key = derive_key(password, &salt, (*iterations).max(1));
                constant_time_eq(&key, &expected)
            }
            Credential::Plain { password: stored } => {
                constant_time_eq(stored.as_bytes(), password.as_bytes())
            }
        }
    }

    pub fn is_plain(&self) -> bool {
        matches!(self, Credential::Plain { .. })
    }
}

fn derive_key(password: &str, salt: &[u8], iterations: u32) -> [u8; KEY_LEN] {
    let mut key = [0u8; KEY_LEN];
    pbkdf2_hmac::<Sha256>(password.as_bytes(), salt, iterations, &mut key);
    key
}

/// Compares without short-circuiting on the first differing byte.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
