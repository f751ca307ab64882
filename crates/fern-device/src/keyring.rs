//! Module for interacting with the platform keyring, which owns the accounts and their keys

use std::sync::Arc;

use once_cell::sync::OnceCell;
use tracing::warn;

#[derive(Debug, Clone, Hash, Eq, PartialEq, uniffi::Error, thiserror::Error)]
pub enum KeyringError {
    #[error("signing request was rejected")]
    Rejected,

    #[error("unable to sign message: {0}")]
    Sign(String),

    #[error("unexpected keyring error: {0}")]
    Unexpected(String),
}

impl From<uniffi::UnexpectedUniFFICallbackError> for KeyringError {
    fn from(error: uniffi::UnexpectedUniFFICallbackError) -> Self {
        Self::Unexpected(error.reason)
    }
}

/// `eth_sign` style personal message request, `data` is hex encoded
#[derive(Debug, Clone, Hash, Eq, PartialEq, uniffi::Record)]
pub struct PersonalMessageParams {
    pub data: String,
    pub from: String,
}

#[uniffi::export(callback_interface)]
pub trait KeyringAccess: Send + Sync + std::fmt::Debug + 'static {
    /// Accounts in keyring order, the first one is the primary account
    fn accounts(&self) -> Vec<String>;

    /// Signing may prompt for a hardware confirmation depending on the keyring type
    fn sign_personal_message(
        &self,
        params: PersonalMessageParams,
    ) -> Result<String, KeyringError>;
}

static REF: OnceCell<Keyring> = OnceCell::new();

#[derive(Debug, Clone, uniffi::Object)]
pub struct Keyring(Arc<Box<dyn KeyringAccess>>);

#[uniffi::export]
impl Keyring {
    /// Creates the global keyring
    ///
    /// # Panics
    ///
    /// Panics if the global keyring fails to be set
    #[uniffi::constructor]
    pub fn new(keyring: Box<dyn KeyringAccess>) -> Self {
        if let Some(me) = REF.get() {
            warn!("keyring is already initialized");
            return me.clone();
        }

        let me = Self::from_access(keyring);
        REF.set(me).expect("failed to set keyring");

        Keyring::global().clone()
    }
}

impl Keyring {
    /// Returns the global keyring
    ///
    /// # Panics
    ///
    /// Panics if the keyring has not been initialized
    pub fn global() -> &'static Self {
        REF.get().expect("keyring is not initialized")
    }

    /// Wrap a keyring without registering it globally
    pub fn from_access(keyring: Box<dyn KeyringAccess>) -> Self {
        Self(Arc::new(keyring))
    }

    pub fn first_account(&self) -> Option<String> {
        self.0.accounts().into_iter().next()
    }

    pub fn sign_personal_message(
        &self,
        params: PersonalMessageParams,
    ) -> Result<String, KeyringError> {
        self.0.sign_personal_message(params)
    }
}
