use fern_util::encryption::PassphraseCryptor;

#[derive(Debug, Clone, Hash, Eq, PartialEq, uniffi::Error, thiserror::Error)]
pub enum EncryptorError {
    #[error("unable to encrypt: {0}")]
    Encrypt(String),

    #[error("unable to decrypt: {0}")]
    Decrypt(String),

    #[error("unexpected encryptor error: {0}")]
    Unexpected(String),
}

impl From<uniffi::UnexpectedUniFFICallbackError> for EncryptorError {
    fn from(error: uniffi::UnexpectedUniFFICallbackError) -> Self {
        Self::Unexpected(error.reason)
    }
}

/// Symmetric encryption under a passphrase
///
/// Implemented by the platform or by [`DefaultEncryptor`]
#[uniffi::export(with_foreign)]
pub trait Encryptor: Send + Sync + std::fmt::Debug + 'static {
    fn encrypt(&self, passphrase: String, plaintext: String) -> Result<String, EncryptorError>;

    /// Fails when the passphrase does not match or the ciphertext is corrupted
    fn decrypt(&self, passphrase: String, ciphertext: String) -> Result<String, EncryptorError>;
}

/// argon2id and ChaCha20-Poly1305, see [`PassphraseCryptor`]
#[derive(Debug, Copy, Clone, Default)]
pub struct DefaultEncryptor;

impl DefaultEncryptor {
    pub fn new() -> Self {
        Self
    }
}

impl Encryptor for DefaultEncryptor {
    fn encrypt(&self, passphrase: String, plaintext: String) -> Result<String, EncryptorError> {
        PassphraseCryptor::new(passphrase)
            .encrypt_to_string(&plaintext)
            .map_err(|error| EncryptorError::Encrypt(error.to_string()))
    }

    fn decrypt(&self, passphrase: String, ciphertext: String) -> Result<String, EncryptorError> {
        PassphraseCryptor::new(passphrase)
            .decrypt_from_string(&ciphertext)
            .map_err(|error| EncryptorError::Decrypt(error.to_string()))
    }
}
