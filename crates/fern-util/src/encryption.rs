//! Passphrase based encryption, used when no platform encryptor is supplied

use argon2::Argon2;
use base64::Engine as _;
use base64::prelude::BASE64_STANDARD;
use chacha20poly1305::{ChaCha20Poly1305, Key, KeyInit as _, Nonce, aead::Aead as _};
use rand::Rng as _;
use zeroize::Zeroizing;

const SPLITTER: &str = "::";
const SALT_LEN: usize = 16;
const NONCE_LEN: usize = 12;
const KEY_LEN: usize = 32;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("string is not in the correct format")]
    SaltNonceAndCiphertextNotFound,

    #[error("salt not in base64 format")]
    SaltInvalidFormat(base64::DecodeError),

    #[error("nonce not in base64 format")]
    NonceInvalidFormat(base64::DecodeError),

    #[error("ciphertext not in base64 format")]
    CiphertextInvalidFormat(base64::DecodeError),

    #[error("invalid length for {0}")]
    InvalidLength(&'static str),

    #[error("unable to derive key: {0}")]
    KeyDerivation(String),

    #[error("unable to encrypt: {0}")]
    UnableToEncrypt(chacha20poly1305::Error),

    #[error("unable to decrypt: {0}")]
    UnableToDecrypt(chacha20poly1305::Error),

    #[error("invalid utf8 string")]
    InvalidUtf8(std::string::FromUtf8Error),
}

/// Encrypts strings under a passphrase, the key is stretched with argon2id and a random salt
#[derive(Debug, Clone)]
pub struct PassphraseCryptor {
    passphrase: Zeroizing<String>,
}

impl PassphraseCryptor {
    pub fn new(passphrase: impl Into<String>) -> Self {
        Self { passphrase: Zeroizing::new(passphrase.into()) }
    }

    /// Output format is `base64(salt)::base64(nonce)::base64(ciphertext)`
    pub fn encrypt_to_string(&self, plaintext: &str) -> Result<String, Error> {
        let rng = &mut rand::rng();

        let mut salt = [0u8; SALT_LEN];
        rng.fill(&mut salt);

        let mut nonce = [0u8; NONCE_LEN];
        rng.fill(&mut nonce);

        let cipher = self.cipher(&salt)?;
        let encrypted = cipher
            .encrypt(Nonce::from_slice(&nonce), plaintext.as_bytes())
            .map_err(Error::UnableToEncrypt)?;

        let salt = BASE64_STANDARD.encode(salt);
        let nonce = BASE64_STANDARD.encode(nonce);
        let encrypted = BASE64_STANDARD.encode(encrypted);

        Ok(format!("{salt}{SPLITTER}{nonce}{SPLITTER}{encrypted}"))
    }

    pub fn decrypt_from_string(&self, encrypted: &str) -> Result<String, Error> {
        let mut parts = encrypted.splitn(3, SPLITTER);
        let (Some(salt), Some(nonce), Some(ciphertext)) = (parts.next(), parts.next(), parts.next())
        else {
            return Err(Error::SaltNonceAndCiphertextNotFound);
        };

        let salt = BASE64_STANDARD.decode(salt).map_err(Error::SaltInvalidFormat)?;
        let nonce = BASE64_STANDARD.decode(nonce).map_err(Error::NonceInvalidFormat)?;
        let ciphertext =
            BASE64_STANDARD.decode(ciphertext).map_err(Error::CiphertextInvalidFormat)?;

        if salt.len() != SALT_LEN {
            return Err(Error::InvalidLength("salt"));
        }

        if nonce.len() != NONCE_LEN {
            return Err(Error::InvalidLength("nonce"));
        }

        let decrypted = self
            .cipher(&salt)?
            .decrypt(Nonce::from_slice(&nonce), ciphertext.as_slice())
            .map_err(Error::UnableToDecrypt)?;

        String::from_utf8(decrypted).map_err(Error::InvalidUtf8)
    }

    fn cipher(&self, salt: &[u8]) -> Result<ChaCha20Poly1305, Error> {
        let mut key = Zeroizing::new([0u8; KEY_LEN]);

        Argon2::default()
            .hash_password_into(self.passphrase.as_bytes(), salt, key.as_mut_slice())
            .map_err(|error| Error::KeyDerivation(error.to_string()))?;

        Ok(ChaCha20Poly1305::new(Key::from_slice(key.as_slice())))
    }
}
