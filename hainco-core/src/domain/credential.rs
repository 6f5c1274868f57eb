//! Credential codec - reversible password storage
//!
//! Staff, customer and admin passwords are stored as a `(stored_value, salt)`
//! pair that can be turned back into the original plaintext. Each secret byte
//! is shifted inside the printable ASCII alphabet by an amount taken from a
//! SHA-256 counter-mode keystream keyed by the server credential key and the
//! per-record salt.
//!
//! There is no integrity check: recovering with a salt that belongs to a
//! different record yields an unrelated printable string, not an error.

use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

/// Length of the per-record salt in bytes
pub const SALT_LEN: usize = 16;

/// Leading byte of every stored value
pub const FORMAT_VERSION: u8 = 1;

/// First symbol of the supported alphabet (space)
const ALPHABET_START: u8 = 0x20;
/// Last symbol of the supported alphabet (tilde)
const ALPHABET_END: u8 = 0x7E;
const ALPHABET_SIZE: u8 = ALPHABET_END - ALPHABET_START + 1;

/// Keystream bytes at or above this value are skipped so that
/// `byte % ALPHABET_SIZE` stays uniform.
const KEYSTREAM_LIMIT: u8 = ALPHABET_SIZE * 2;

const KEY_DOMAIN: &[u8] = b"hainco/credential-codec/v1";

/// Errors raised by [`CredentialCodec`]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// The secret contains a byte outside printable ASCII
    #[error("Password contains an unsupported character at position {position}")]
    Encoding { position: usize },

    /// The stored pair is structurally invalid
    #[error("Stored credential is malformed: {0}")]
    Decoding(DecodingFault),
}

/// What made a stored pair undecodable
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodingFault {
    EmptyValue,
    UnsupportedVersion(u8),
    InvalidSymbol { position: usize },
    SaltLength { expected: usize, actual: usize },
}

impl fmt::Display for DecodingFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodingFault::EmptyValue => write!(f, "stored value is empty"),
            DecodingFault::UnsupportedVersion(v) => write!(f, "unsupported format version {}", v),
            DecodingFault::InvalidSymbol { position } => {
                write!(f, "invalid symbol at position {}", position)
            }
            DecodingFault::SaltLength { expected, actual } => {
                write!(f, "salt must be {} bytes, got {}", expected, actual)
            }
        }
    }
}

/// A `(stored_value, salt)` pair as persisted next to its owning record
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredCredential {
    pub stored_value: Vec<u8>,
    pub salt: Vec<u8>,
}

impl fmt::Debug for StoredCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "StoredCredential([REDACTED, {} bytes], salt {} bytes)",
            self.stored_value.len(),
            self.salt.len()
        )
    }
}

/// Reversible password transform keyed by a server-wide secret
///
/// Cheap to share: holds only the derived 32-byte key and never mutates it.
#[derive(Clone)]
pub struct CredentialCodec {
    key: [u8; 32],
}

impl CredentialCodec {
    /// Build a codec from the server credential key
    pub fn new(server_key: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(KEY_DOMAIN);
        hasher.update(server_key);
        Self {
            key: hasher.finalize().into(),
        }
    }

    /// Protect a plaintext secret, generating a fresh salt
    pub fn protect(&self, secret: &str) -> Result<StoredCredential, CodecError> {
        if let Some(position) = secret.bytes().position(|b| !is_supported(b)) {
            return Err(CodecError::Encoding { position });
        }

        let salt: [u8; SALT_LEN] = rand::thread_rng().gen();
        let mut keystream = Keystream::new(&self.key, &salt);

        let mut stored_value = Vec::with_capacity(secret.len() + 1);
        stored_value.push(FORMAT_VERSION);
        for b in secret.bytes() {
            let shift = keystream.next_shift();
            stored_value.push(ALPHABET_START + (b - ALPHABET_START + shift) % ALPHABET_SIZE);
        }

        Ok(StoredCredential {
            stored_value,
            salt: salt.to_vec(),
        })
    }

    /// Recover the plaintext from a pair produced by [`protect`](Self::protect)
    pub fn recover(&self, stored_value: &[u8], salt: &[u8]) -> Result<String, CodecError> {
        if salt.len() != SALT_LEN {
            return Err(CodecError::Decoding(DecodingFault::SaltLength {
                expected: SALT_LEN,
                actual: salt.len(),
            }));
        }

        let (&version, payload) = stored_value
            .split_first()
            .ok_or(CodecError::Decoding(DecodingFault::EmptyValue))?;
        if version != FORMAT_VERSION {
            return Err(CodecError::Decoding(DecodingFault::UnsupportedVersion(version)));
        }
        if let Some(position) = payload.iter().position(|&b| !is_supported(b)) {
            return Err(CodecError::Decoding(DecodingFault::InvalidSymbol { position }));
        }

        let mut keystream = Keystream::new(&self.key, salt);
        let secret = payload
            .iter()
            .map(|&b| {
                let shift = keystream.next_shift();
                let offset = (b - ALPHABET_START + ALPHABET_SIZE - shift) % ALPHABET_SIZE;
                char::from(ALPHABET_START + offset)
            })
            .collect();

        Ok(secret)
    }

    /// Shorthand for recovering a persisted pair
    pub fn recover_stored(&self, credential: &StoredCredential) -> Result<String, CodecError> {
        self.recover(&credential.stored_value, &credential.salt)
    }
}

impl fmt::Debug for CredentialCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CredentialCodec([REDACTED])")
    }
}

fn is_supported(b: u8) -> bool {
    (ALPHABET_START..=ALPHABET_END).contains(&b)
}

/// SHA-256 counter-mode keystream over `key || salt || counter`
struct Keystream<'a> {
    key: &'a [u8; 32],
    salt: &'a [u8],
    counter: u64,
    block: [u8; 32],
    pos: usize,
}

impl<'a> Keystream<'a> {
    fn new(key: &'a [u8; 32], salt: &'a [u8]) -> Self {
        Self {
            key,
            salt,
            counter: 0,
            block: [0u8; 32],
            pos: 32,
        }
    }

    fn refill(&mut self) {
        let mut hasher = Sha256::new();
        hasher.update(self.key);
        hasher.update(self.salt);
        hasher.update(self.counter.to_le_bytes());
        self.block = hasher.finalize().into();
        self.counter += 1;
        self.pos = 0;
    }

    fn next_shift(&mut self) -> u8 {
        loop {
            if self.pos == self.block.len() {
                self.refill();
            }
            let b = self.block[self.pos];
            self.pos += 1;
            if b < KEYSTREAM_LIMIT {
                return b % ALPHABET_SIZE;
            }
        }
    }
}
