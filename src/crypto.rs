//! Password digests in the formats that OpenNMS accepts for its user store.
//!
//! OpenNMS understands two password formats:
//!
//! * **Plain MD5** ([DigestMode::PlainMd5]): the MD5 hash of the password, as 32 uppercase hex
//!   characters. This format is insecure and exists only for compatibility with older servers.
//!
//! * **Salted** ([DigestMode::Salted]): a Base64 blob containing a 16-byte salt followed by the
//!   result of hashing `salt || password` with SHA-256, then rehashing the output, for a total of
//!   [ITERATIONS] rounds. This matches Jasypt's `StrongPasswordEncryptor`, which OpenNMS uses to
//!   check salted passwords. Users stored with this format must have `passwordSalt` set to `true`.
//!
//! Nothing in this module logs or returns plaintexts or salts in error messages.

use crate::error::{Error, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use md5::Md5;
use sha2::{Digest, Sha256};
use std::fmt::{self, Display};
use std::str::FromStr;

/// The length of the salt at the start of a salted digest, in bytes.
pub const SALT_SIZE: usize = 16;

/// The number of SHA-256 rounds in a salted digest.
pub const ITERATIONS: u32 = 100_000;

/// The length of a decoded salted digest: the salt followed by one SHA-256 output.
pub const SALTED_DIGEST_SIZE: usize = SALT_SIZE + 32;

/// The hashing schemes that OpenNMS accepts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DigestMode {
    /// Uppercase hex MD5. Legacy; prefer [DigestMode::Salted].
    #[default]
    PlainMd5,

    /// Base64 of `salt || SHA-256^100000(salt || password)`.
    Salted,
}

impl FromStr for DigestMode {
    type Err = Error;

    /// Parses a mode name. Accepts `plain-md5` and `salted`, plus the shorter `md5` and `salt`.
    fn from_str(s: &str) -> Result<Self> {
        match s {
            "plain-md5" | "md5" => Ok(DigestMode::PlainMd5),
            "salted" | "salt" => Ok(DigestMode::Salted),
            other => Err(Error::UnsupportedDigestMode(other.to_owned())),
        }
    }
}

impl Display for DigestMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DigestMode::PlainMd5 => write!(f, "plain-md5"),
            DigestMode::Salted => write!(f, "salted"),
        }
    }
}

/// A supply of salts for [DigestMode::Salted] when the caller doesn't provide a salt string.
///
/// Production code uses [OsSalt]. Tests can implement this trait to pin the salt and check exact
/// output.
pub trait SaltSource {
    /// Returns a fresh salt.
    fn salt(&mut self) -> [u8; SALT_SIZE];
}

/// Draws salts from the thread-local CSPRNG.
#[derive(Clone, Copy, Debug, Default)]
pub struct OsSalt;

impl SaltSource for OsSalt {
    fn salt(&mut self) -> [u8; SALT_SIZE] {
        rand::random()
    }
}

/// Computes a password digest, parsing `mode` by name.
///
/// `salt` only applies to [DigestMode::Salted]. If it is `Some`, the digest is deterministic;
/// otherwise a random salt is generated with [OsSalt].
///
/// # Errors
///
/// Returns [Error::UnsupportedDigestMode] if `mode` isn't a mode that [DigestMode::from_str]
/// recognizes. No hashing happens in that case.
pub fn digest(plaintext: &str, mode: &str, salt: Option<&str>) -> Result<String> {
    let mode = mode.parse()?;
    Ok(digest_with(plaintext, mode, salt, &mut OsSalt))
}

/// Computes a password digest with an explicit [SaltSource].
///
/// `source` is only consulted when `mode` is [DigestMode::Salted] and `salt` is `None`.
pub fn digest_with(
    plaintext: &str,
    mode: DigestMode,
    salt: Option<&str>,
    source: &mut impl SaltSource,
) -> String {
    match mode {
        DigestMode::PlainMd5 => md5_digest(plaintext),
        DigestMode::Salted => {
            let salt = match salt {
                Some(s) => salt_from_str(s),
                None => source.salt(),
            };
            salted_digest(plaintext, salt)
        }
    }
}

/// Returns the uppercase hex MD5 digest of `plaintext`.
pub fn md5_digest(plaintext: &str) -> String {
    Md5::digest(plaintext.as_bytes())
        .iter()
        .map(|byte| format!("{byte:02X}"))
        .collect()
}

/// Derives a salt from a string by hashing it with MD5.
pub fn salt_from_str(salt: &str) -> [u8; SALT_SIZE] {
    let mut out = [0; SALT_SIZE];
    out.copy_from_slice(&Md5::digest(salt.as_bytes()));
    out
}

/// Returns the Base64-encoded salted digest of `plaintext` under `salt`.
pub fn salted_digest(plaintext: &str, salt: [u8; SALT_SIZE]) -> String {
    let mut blob = Vec::with_capacity(SALTED_DIGEST_SIZE);
    blob.extend_from_slice(&salt);
    blob.extend_from_slice(&iterate(&salt, plaintext));
    STANDARD.encode(blob)
}

/// Hashes `salt || plaintext` and rehashes the output until [ITERATIONS] rounds have run.
fn iterate(salt: &[u8; SALT_SIZE], plaintext: &str) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(salt);
    hasher.update(plaintext.as_bytes());
    let mut hash = hasher.finalize();
    for _ in 1..ITERATIONS {
        hash = Sha256::digest(hash);
    }
    let mut out = [0; 32];
    out.copy_from_slice(&hash);
    out
}

/// Checks whether `digest` was derived from `plaintext`.
///
/// Recognizes both formats that [digest] produces: 32 hex characters are compared as a plain MD5
/// digest (case-insensitively), and Base64 that decodes to [SALTED_DIGEST_SIZE] bytes is rederived
/// with its embedded salt. Anything else returns `false`.
pub fn verify(plaintext: &str, digest: &str) -> bool {
    if digest.len() == 32 && digest.chars().all(|c| c.is_ascii_hexdigit()) {
        return md5_digest(plaintext).eq_ignore_ascii_case(digest);
    }

    let blob = match STANDARD.decode(digest) {
        Ok(blob) if blob.len() == SALTED_DIGEST_SIZE => blob,
        _ => return false,
    };
    let (salt, expected) = blob.split_at(SALT_SIZE);
    let Ok(salt) = <[u8; SALT_SIZE]>::try_from(salt) else {
        return false;
    };
    iterate(&salt, plaintext) == expected
}

#[cfg(test)]
mod test;
