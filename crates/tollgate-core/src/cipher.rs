//! Symmetric identity encryption
//!
//! The identity travels inside a token claim, so ciphertext must be stable
//! text: AES-128-ECB with PKCS#7 padding (deterministic, no nonce) encoded
//! as uppercase hex. The key is derived from the passphrase with a pinned,
//! versioned KDF so that independent processes sharing only the passphrase
//! produce the same key. Changing the KDF parameters, the key size or the
//! cipher mode breaks every previously issued token.

use aes::cipher::block_padding::Pkcs7;
use aes::cipher::{BlockDecryptMut, BlockEncryptMut, KeyInit};
use aes::Aes128;
use sha2::Sha256;

type Aes128EcbEnc = ecb::Encryptor<Aes128>;
type Aes128EcbDec = ecb::Decryptor<Aes128>;

/// Versioned KDF salt. Bump the version suffix only together with a
/// deliberate break of all outstanding tokens.
const KEY_DERIVATION_SALT: &[u8] = b"tollgate-identity-key-v1";

/// PBKDF2-HMAC-SHA256 round count (pinned)
const KEY_DERIVATION_ROUNDS: u32 = 10_000;

/// AES-128 key length in bytes
const KEY_LEN: usize = 16;

/// Identity cipher with a passphrase-derived AES-128 key.
///
/// All failure modes (blank input, bad hex, bad padding, non-UTF-8
/// plaintext) are logged and collapsed into `None`; callers treat `None`
/// as "encryption unavailable" and fail their own operation.
#[derive(Clone)]
pub struct IdentityCipher {
    key: [u8; KEY_LEN],
}

impl IdentityCipher {
    /// Derive the cipher key from a passphrase.
    ///
    /// Deterministic: the same passphrase bytes always yield the same key,
    /// across process runs and platforms.
    pub fn new(passphrase: &str) -> Self {
        let mut key = [0u8; KEY_LEN];
        pbkdf2::pbkdf2_hmac::<Sha256>(
            passphrase.as_bytes(),
            KEY_DERIVATION_SALT,
            KEY_DERIVATION_ROUNDS,
            &mut key,
        );
        Self { key }
    }

    /// Encrypt a plaintext string. `None` on blank input.
    pub fn encrypt(&self, plaintext: &str) -> Option<Vec<u8>> {
        if plaintext.trim().is_empty() {
            tracing::debug!("refusing to encrypt blank plaintext");
            return None;
        }
        let ciphertext = Aes128EcbEnc::new(&self.key.into())
            .encrypt_padded_vec_mut::<Pkcs7>(plaintext.as_bytes());
        Some(ciphertext)
    }

    /// Decrypt ciphertext bytes. `None` on empty input or any cipher error.
    pub fn decrypt(&self, data: &[u8]) -> Option<Vec<u8>> {
        if data.is_empty() {
            tracing::debug!("refusing to decrypt empty ciphertext");
            return None;
        }
        match Aes128EcbDec::new(&self.key.into()).decrypt_padded_vec_mut::<Pkcs7>(data) {
            Ok(plaintext) => Some(plaintext),
            Err(_) => {
                tracing::debug!("ciphertext failed to decrypt");
                None
            }
        }
    }

    /// Encrypt to an uppercase hex string for embedding in a text claim.
    pub fn encrypt_to_hex(&self, plaintext: &str) -> Option<String> {
        self.encrypt(plaintext).map(|bytes| to_hex(&bytes))
    }

    /// Decrypt an uppercase hex string back to the plaintext string.
    pub fn decrypt_from_hex(&self, ciphertext_hex: &str) -> Option<String> {
        if ciphertext_hex.trim().is_empty() {
            return None;
        }
        let bytes = from_hex(ciphertext_hex)?;
        let plaintext = self.decrypt(&bytes)?;
        match String::from_utf8(plaintext) {
            Ok(s) => Some(s),
            Err(_) => {
                tracing::debug!("decrypted identity is not valid UTF-8");
                None
            }
        }
    }
}

impl std::fmt::Debug for IdentityCipher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityCipher").finish_non_exhaustive()
    }
}

/// Encode bytes as uppercase hex. Total: never fails.
pub fn to_hex(bytes: &[u8]) -> String {
    hex::encode_upper(bytes)
}

/// Decode a hex string. `None` on odd length or non-hex characters.
pub fn from_hex(s: &str) -> Option<Vec<u8>> {
    hex::decode(s).ok()
}
