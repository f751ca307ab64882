//! Mnemonic backup and restore
//!
//! The backup passphrase is the keyring's signature over a fixed message, so no extra secret is
//! stored. It is derived again for every encrypt and decrypt and never cached, which relies on the
//! keyring signing deterministically for the same account and message.

use std::sync::Arc;

use bip39::{Language, Mnemonic};
use tracing::{debug, warn};
use zeroize::Zeroizing;

use fern_device::{
    encryptor::{DefaultEncryptor, Encryptor},
    keyring::{Keyring, PersonalMessageParams},
    private_box::PrivateBox,
};
use fern_util::{hex_encode_message, result_ext::ResultExt as _};

use crate::database::{Database, local_storage::LocalStorageTable};

/// Message signed to derive the backup passphrase, changing it orphans every existing backup
pub const BACKUP_SIGNATURE_MESSAGE: &str = "Fern mnemonic backup";

/// Slot in the private box holding the remote backup
pub const PRIVATE_BOX_KEY: &str = "mnemonic_backup";

/// Local storage key holding the on device copy
pub const LOCAL_STORAGE_KEY: &str = "@Fern:encryptedMnemonic";

/// Signature used as the encryption passphrase, wiped on drop
pub type Passphrase = Zeroizing<String>;

type Error = MnemonicBackupError;
type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Clone, Hash, Eq, PartialEq, uniffi::Error, thiserror::Error)]
pub enum MnemonicBackupError {
    #[error("keyring has no accounts")]
    NoAccounts,

    #[error("unable to sign backup message: {0}")]
    Sign(String),

    #[error("unable to encrypt mnemonic: {0}")]
    Encrypt(String),

    #[error("unable to decrypt mnemonic: {0}")]
    Decrypt(String),

    #[error("invalid mnemonic: {0}")]
    InvalidMnemonic(String),

    #[error("private box failed: {0}")]
    PrivateBox(String),

    #[error("local storage failed: {0}")]
    LocalStorage(String),
}

#[derive(Debug, Clone, uniffi::Object)]
pub struct MnemonicBackup {
    keyring: Keyring,
    encryptor: Arc<dyn Encryptor>,
    private_box: PrivateBox,
    local_storage: LocalStorageTable,
}

#[uniffi::export]
impl MnemonicBackup {
    /// Uses the global keyring, private box and database
    ///
    /// # Panics
    ///
    /// Panics if the keyring or the private box have not been initialized
    #[uniffi::constructor]
    pub fn new(encryptor: Arc<dyn Encryptor>) -> Self {
        Self::with_capabilities(
            Keyring::global().clone(),
            encryptor,
            PrivateBox::global().clone(),
            Database::global().local_storage.clone(),
        )
    }

    /// Same as [`MnemonicBackup::new`] with the built in encryptor
    #[uniffi::constructor]
    pub fn with_default_encryptor() -> Self {
        Self::new(Arc::new(DefaultEncryptor::new()))
    }

    /// Encrypt the mnemonic, store it in the private box and keep a local copy
    ///
    /// Returns the encrypted mnemonic
    pub fn backup(&self, mnemonic: String) -> Result<String> {
        let encrypted = self.encrypt_mnemonic(mnemonic)?;

        self.persist_backup(encrypted.clone())?;
        self.save_local_copy(encrypted.clone())?;

        Ok(encrypted)
    }

    /// Load the backup, falling back to the local copy when the private box slot is empty
    ///
    /// `None` when there is no backup at all
    pub fn restore(&self) -> Result<Option<String>> {
        let encrypted = match self.load_backup()? {
            Some(encrypted) => Some(encrypted),
            None => {
                debug!("no backup in the private box, trying the local copy");
                self.load_local_copy()?
            }
        };

        encrypted.map(|encrypted| self.decrypt_mnemonic(encrypted)).transpose()
    }

    pub fn encrypt_mnemonic(&self, mnemonic: String) -> Result<String> {
        let mnemonic = Zeroizing::new(mnemonic);
        validate_mnemonic(&mnemonic)?;

        let passphrase = self.derive_backup_passphrase()?;
        self.encryptor
            .encrypt(passphrase.to_string(), mnemonic.to_string())
            .map_err_str(Error::Encrypt)
    }

    pub fn decrypt_mnemonic(&self, encrypted: String) -> Result<String> {
        let passphrase = self.derive_backup_passphrase()?;

        let mnemonic = self
            .encryptor
            .decrypt(passphrase.to_string(), encrypted)
            .map_err_str(Error::Decrypt)?;

        let mnemonic = Zeroizing::new(mnemonic);
        validate_mnemonic(&mnemonic)?;

        Ok(mnemonic.to_string())
    }

    /// Overwrites any previous backup
    pub fn persist_backup(&self, encrypted: String) -> Result<()> {
        self.private_box.put(PRIVATE_BOX_KEY, encrypted).map_err_str(Error::PrivateBox)
    }

    pub fn load_backup(&self) -> Result<Option<String>> {
        self.private_box.get(PRIVATE_BOX_KEY).map_err_str(Error::PrivateBox)
    }

    pub fn save_local_copy(&self, encrypted: String) -> Result<()> {
        self.local_storage.set_item(LOCAL_STORAGE_KEY, encrypted).map_err_str(Error::LocalStorage)
    }

    pub fn load_local_copy(&self) -> Result<Option<String>> {
        self.local_storage.get_item(LOCAL_STORAGE_KEY).map_err_str(Error::LocalStorage)
    }
}

impl MnemonicBackup {
    pub fn with_capabilities(
        keyring: Keyring,
        encryptor: Arc<dyn Encryptor>,
        private_box: PrivateBox,
        local_storage: LocalStorageTable,
    ) -> Self {
        Self { keyring, encryptor, private_box, local_storage }
    }

    /// Sign the backup message with the first account
    pub fn derive_backup_passphrase(&self) -> Result<Passphrase> {
        let from = self.keyring.first_account().ok_or(Error::NoAccounts)?;
        let data = hex_encode_message(BACKUP_SIGNATURE_MESSAGE);

        let signature = self
            .keyring
            .sign_personal_message(PersonalMessageParams { data, from })
            .map_err_str(Error::Sign)?;

        Ok(Zeroizing::new(signature))
    }
}

fn validate_mnemonic(mnemonic: &str) -> Result<()> {
    if let Err(error) = Mnemonic::parse_in_normalized(Language::English, mnemonic) {
        warn!("mnemonic failed validation: {error}");
        return Err(Error::InvalidMnemonic(error.to_string()));
    }

    Ok(())
}
