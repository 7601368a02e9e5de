//! Passphrase-keyed AES-256-CBC for small secrets (cloud API secrets).
//!
//! Envelope format: `base64(iv) + ":" + base64(ciphertext)`, standard alphabet with padding,
//! PKCS#7 block padding. There is no authentication tag: a tampered envelope may decrypt to
//! garbage or fail on padding, it is never detected as tampering.

use aes::Aes256;
use base64::{engine::general_purpose::STANDARD, Engine};
use cbc::cipher::{block_padding::Pkcs7, BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use rand_core::{OsRng, RngCore};
use sha2::{Digest, Sha256};
use thiserror::Error;

type Aes256CbcEnc = cbc::Encryptor<Aes256>;
type Aes256CbcDec = cbc::Decryptor<Aes256>;

const IV_LEN: usize = 16;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CipherError {
    #[error("Envelope must have exactly one ':' separator")]
    MalformedEnvelope,

    #[error("Invalid base64 in envelope {0}")]
    InvalidBase64(&'static str),

    #[error("IV must be 16 bytes, got {0}")]
    InvalidIv(usize),

    #[error("Decryption failed (wrong key or corrupted ciphertext)")]
    BadPadding,

    #[error("Decrypted secret is not valid UTF-8")]
    InvalidUtf8,
}

/// Symmetric cipher keyed once from an operator passphrase
#[derive(Clone)]
pub struct SecretCipher {
    key: [u8; 32],
}

impl std::fmt::Debug for SecretCipher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecretCipher").finish_non_exhaustive()
    }
}

impl SecretCipher {
    /// Derive the 32-byte key as SHA-256 of the passphrase
    pub fn new(passphrase: &str) -> Self {
        let digest = Sha256::digest(passphrase.as_bytes());
        let mut key = [0u8; 32];
        key.copy_from_slice(&digest);
        Self { key }
    }

    /// Encrypt with a fresh random IV per call
    pub fn encrypt(&self, plaintext: &str) -> String {
        let mut iv = [0u8; IV_LEN];
        OsRng.fill_bytes(&mut iv);

        let ciphertext = Aes256CbcEnc::new(&self.key.into(), &iv.into())
            .encrypt_padded_vec_mut::<Pkcs7>(plaintext.as_bytes());

        format!("{}:{}", STANDARD.encode(iv), STANDARD.encode(ciphertext))
    }

    /// Strict decryption: every failure, including a malformed envelope, is an error
    pub fn open(&self, envelope: &str) -> Result<String, CipherError> {
        let parts: Vec<&str> = envelope.split(':').collect();
        let [iv_b64, data_b64] = parts.as_slice() else {
            return Err(CipherError::MalformedEnvelope);
        };

        let iv = STANDARD
            .decode(iv_b64)
            .map_err(|_| CipherError::InvalidBase64("iv"))?;
        let iv: [u8; IV_LEN] = iv
            .as_slice()
            .try_into()
            .map_err(|_| CipherError::InvalidIv(iv.len()))?;
        let data = STANDARD
            .decode(data_b64)
            .map_err(|_| CipherError::InvalidBase64("ciphertext"))?;

        let plaintext = Aes256CbcDec::new(&self.key.into(), &iv.into())
            .decrypt_padded_vec_mut::<Pkcs7>(&data)
            .map_err(|_| CipherError::BadPadding)?;

        String::from_utf8(plaintext).map_err(|_| CipherError::InvalidUtf8)
    }

    /// Compatibility decryption: a malformed envelope yields `Ok("")` rather than an error.
    ///
    /// Any other failure (bad base64, wrong key, padding) is still an error. Callers must
    /// treat an empty result as ambiguous: it is either an empty secret or a broken envelope.
    /// Use [`SecretCipher::open`] to tell the two apart.
    pub fn decrypt(&self, envelope: &str) -> Result<String, CipherError> {
        match self.open(envelope) {
            Err(CipherError::MalformedEnvelope) => Ok(String::new()),
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cipher() -> SecretCipher {
        SecretCipher::new("default-test-key")
    }

    #[test]
    fn decrypts_what_it_encrypts() {
        let c = cipher();
        for s in ["", "x", "api-secret-123", "exactly sixteen!", "سلام دنیا", "a:b:c"] {
            assert_eq!(c.decrypt(&c.encrypt(s)).unwrap(), s, "round trip for {:?}", s);
        }
    }

    #[test]
    fn envelope_shape() {
        let envelope = cipher().encrypt("hello");
        let (iv, data) = envelope.split_once(':').unwrap();
        assert_eq!(STANDARD.decode(iv).unwrap().len(), IV_LEN);
        // one block for a short plaintext
        assert_eq!(STANDARD.decode(data).unwrap().len(), 16);
        assert_eq!(envelope.matches(':').count(), 1);
    }

    #[test]
    fn fresh_iv_per_call() {
        let c = cipher();
        assert_ne!(c.encrypt("same"), c.encrypt("same"));
    }

    #[test]
    fn malformed_envelope_decrypts_to_empty() {
        let c = cipher();
        assert_eq!(c.decrypt("not-a-valid-envelope").unwrap(), "");
        assert_eq!(c.decrypt("").unwrap(), "");
        assert_eq!(c.decrypt("a:b:c").unwrap(), "");

        let valid = c.encrypt("secret");
        assert_eq!(c.decrypt(&format!("{}:extra", valid)).unwrap(), "");
    }

    #[test]
    fn strict_open_reports_malformed_envelope() {
        assert_eq!(
            cipher().open("not-a-valid-envelope"),
            Err(CipherError::MalformedEnvelope)
        );
    }

    #[test]
    fn other_failures_are_errors() {
        let c = cipher();
        assert_eq!(c.decrypt("!!!:AAAA"), Err(CipherError::InvalidBase64("iv")));
        assert_eq!(c.decrypt("AAAA:AAAA"), Err(CipherError::InvalidIv(3)));

        let envelope = c.encrypt("secret");
        let other = SecretCipher::new("another-key");
        // wrong key almost always breaks PKCS#7 padding; when it doesn't, it must not round trip
        assert_ne!(other.decrypt(&envelope).ok().as_deref(), Some("secret"));
    }

    #[test]
    fn key_derivation_is_deterministic() {
        let a = SecretCipher::new("pass");
        let b = SecretCipher::new("pass");
        assert_eq!(b.decrypt(&a.encrypt("shared")).unwrap(), "shared");
    }
}
