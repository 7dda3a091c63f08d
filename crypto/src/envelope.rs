//! Self-describing sealed payloads.
//!
//! Layout of the decoded payload:
//!
//! ```text
//! version (1) | memory_kib (4, BE) | iterations (4, BE) | parallelism (1)
//!   | salt (16) | nonce (12) | ciphertext + GCM tag
//! ```
//!
//! Everything before the ciphertext is bound as associated data, so a payload
//! whose header was altered fails authentication just like one whose
//! ciphertext was. The whole thing is encoded as standard padded base64.

use aes_gcm::aead::{Aead, KeyInit, Payload};
use aes_gcm::{Aes256Gcm, Nonce};
use argon2::{Algorithm, Argon2, Params, Version};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use zeroize::Zeroize;

use crate::{CryptoError, SharedSecret};

/// Current payload version.
pub const PAYLOAD_VERSION: u8 = 1;

/// Salt length in bytes.
const SALT_LEN: usize = 16;
/// AES-GCM nonce length in bytes (96 bits).
const NONCE_LEN: usize = 12;
/// Version byte plus the three KDF parameters.
const PARAMS_LEN: usize = 1 + 4 + 4 + 1;
const HEADER_LEN: usize = PARAMS_LEN + SALT_LEN + NONCE_LEN;
const TAG_LEN: usize = 16;
const KEY_LEN: usize = 32;

/// Upper bounds accepted when opening, so a crafted header cannot demand
/// unbounded memory or time.
const MAX_MEMORY_KIB: u32 = 1024 * 1024;
const MAX_ITERATIONS: u32 = 16;
const MAX_PARALLELISM: u8 = 16;

/// Argon2id cost parameters, chosen by the sealer and embedded in the payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct KdfParams {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u8,
}

impl KdfParams {
    pub fn new(memory_kib: u32, iterations: u32, parallelism: u8) -> Self {
        Self {
            memory_kib,
            iterations,
            parallelism,
        }
    }

    /// Check the parameters against the Argon2 minimums and our ceilings.
    pub fn validate(&self) -> Result<(), CryptoError> {
        if self.parallelism == 0 || self.parallelism > MAX_PARALLELISM {
            return Err(CryptoError::KdfParams(format!(
                "parallelism must be 1..={MAX_PARALLELISM}, got {}",
                self.parallelism
            )));
        }
        if self.iterations == 0 || self.iterations > MAX_ITERATIONS {
            return Err(CryptoError::KdfParams(format!(
                "iterations must be 1..={MAX_ITERATIONS}, got {}",
                self.iterations
            )));
        }
        let min_memory = 8 * self.parallelism as u32;
        if self.memory_kib < min_memory || self.memory_kib > MAX_MEMORY_KIB {
            return Err(CryptoError::KdfParams(format!(
                "memory must be {min_memory}..={MAX_MEMORY_KIB} KiB, got {}",
                self.memory_kib
            )));
        }
        Ok(())
    }

    fn write_header(&self, out: &mut Vec<u8>) {
        out.push(PAYLOAD_VERSION);
        out.extend_from_slice(&self.memory_kib.to_be_bytes());
        out.extend_from_slice(&self.iterations.to_be_bytes());
        out.push(self.parallelism);
    }

    fn read_header(bytes: &[u8]) -> Self {
        let memory_kib = u32::from_be_bytes([bytes[1], bytes[2], bytes[3], bytes[4]]);
        let iterations = u32::from_be_bytes([bytes[5], bytes[6], bytes[7], bytes[8]]);
        Self {
            memory_kib,
            iterations,
            parallelism: bytes[9],
        }
    }
}

impl Default for KdfParams {
    /// 19 MiB, 2 passes, 1 lane.
    fn default() -> Self {
        Self::new(19 * 1024, 2, 1)
    }
}

/// Seal `plaintext` under `secret`, returning the base64 payload.
pub fn seal(
    plaintext: &[u8],
    secret: &SharedSecret,
    params: KdfParams,
) -> Result<String, CryptoError> {
    params.validate()?;

    let mut rng = rand::thread_rng();
    let mut salt = [0u8; SALT_LEN];
    rng.fill_bytes(&mut salt);
    let mut nonce_bytes = [0u8; NONCE_LEN];
    rng.fill_bytes(&mut nonce_bytes);

    let mut out = Vec::with_capacity(HEADER_LEN + plaintext.len() + TAG_LEN);
    params.write_header(&mut out);
    out.extend_from_slice(&salt);
    out.extend_from_slice(&nonce_bytes);

    let mut key = derive_key(secret, &salt, params)?;
    let cipher = Aes256Gcm::new_from_slice(&key).map_err(|_| CryptoError::Encryption);
    key.zeroize();
    let ciphertext = cipher?
        .encrypt(
            Nonce::from_slice(&nonce_bytes),
            Payload {
                msg: plaintext,
                aad: &out,
            },
        )
        .map_err(|_| CryptoError::Encryption)?;

    out.extend_from_slice(&ciphertext);
    Ok(STANDARD.encode(out))
}

/// Open a payload produced by [`seal`].
pub fn open(payload: &str, secret: &SharedSecret) -> Result<Vec<u8>, CryptoError> {
    let bytes = STANDARD
        .decode(payload.trim())
        .map_err(|e| CryptoError::Encoding(e.to_string()))?;

    if bytes.is_empty() {
        return Err(CryptoError::Truncated {
            needed: HEADER_LEN + TAG_LEN,
            got: 0,
        });
    }
    if bytes[0] != PAYLOAD_VERSION {
        return Err(CryptoError::UnsupportedVersion(bytes[0]));
    }
    if bytes.len() < HEADER_LEN + TAG_LEN {
        return Err(CryptoError::Truncated {
            needed: HEADER_LEN + TAG_LEN,
            got: bytes.len(),
        });
    }

    let params = KdfParams::read_header(&bytes);
    params.validate()?;

    let (header, ciphertext) = bytes.split_at(HEADER_LEN);
    let salt = &header[PARAMS_LEN..PARAMS_LEN + SALT_LEN];
    let nonce_bytes = &header[PARAMS_LEN + SALT_LEN..];

    let mut key = derive_key(secret, salt, params)?;
    let cipher = Aes256Gcm::new_from_slice(&key).map_err(|_| CryptoError::Decryption);
    key.zeroize();
    cipher?
        .decrypt(
            Nonce::from_slice(nonce_bytes),
            Payload {
                msg: ciphertext,
                aad: header,
            },
        )
        .map_err(|_| CryptoError::Decryption)
}

/// Open a payload whose plaintext is expected to be UTF-8 text.
pub fn open_to_string(payload: &str, secret: &SharedSecret) -> Result<String, CryptoError> {
    String::from_utf8(open(payload, secret)?).map_err(|_| CryptoError::NotUtf8)
}

/// Derive a 32-byte key from the secret and salt using Argon2id.
fn derive_key(
    secret: &SharedSecret,
    salt: &[u8],
    params: KdfParams,
) -> Result<[u8; KEY_LEN], CryptoError> {
    let argon_params = Params::new(
        params.memory_kib,
        params.iterations,
        params.parallelism as u32,
        Some(KEY_LEN),
    )
    .map_err(|e| CryptoError::KdfParams(e.to_string()))?;

    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, argon_params);

    let mut output = [0u8; KEY_LEN];
    argon2
        .hash_password_into(secret.expose(), salt, &mut output)
        .map_err(|e| CryptoError::Kdf(e.to_string()))?;
    Ok(output)
}
