//! Remote key value slots scoped to the authenticated user

use std::sync::Arc;

use once_cell::sync::OnceCell;
use tracing::warn;

#[derive(Debug, Clone, Hash, Eq, PartialEq, uniffi::Error, thiserror::Error)]
pub enum PrivateBoxError {
    #[error("private box is not authenticated")]
    NotAuthenticated,

    #[error("unable to write to private box: {0}")]
    Put(String),

    #[error("unable to read from private box: {0}")]
    Get(String),

    #[error("unexpected private box error: {0}")]
    Unexpected(String),
}

impl From<uniffi::UnexpectedUniFFICallbackError> for PrivateBoxError {
    fn from(error: uniffi::UnexpectedUniFFICallbackError) -> Self {
        Self::Unexpected(error.reason)
    }
}

#[uniffi::export(callback_interface)]
pub trait PrivateBoxAccess: Send + Sync + std::fmt::Debug + 'static {
    fn put_private(&self, key: String, value: String) -> Result<(), PrivateBoxError>;
    fn get_private(&self, key: String) -> Result<Option<String>, PrivateBoxError>;
}

static REF: OnceCell<PrivateBox> = OnceCell::new();

#[derive(Debug, Clone, uniffi::Object)]
pub struct PrivateBox(Arc<Box<dyn PrivateBoxAccess>>);

#[uniffi::export]
impl PrivateBox {
    /// Creates the global private box
    ///
    /// # Panics
    ///
    /// Panics if the global private box fails to be set
    #[uniffi::constructor]
    pub fn new(private_box: Box<dyn PrivateBoxAccess>) -> Self {
        if let Some(me) = REF.get() {
            warn!("private box is already initialized");
            return me.clone();
        }

        let me = Self::from_access(private_box);
        REF.set(me).expect("failed to set private box");

        PrivateBox::global().clone()
    }
}

impl PrivateBox {
    /// Returns the global private box
    ///
    /// # Panics
    ///
    /// Panics if the private box has not been initialized
    pub fn global() -> &'static Self {
        REF.get().expect("private box is not initialized")
    }

    pub fn from_access(private_box: Box<dyn PrivateBoxAccess>) -> Self {
        Self(Arc::new(private_box))
    }

    pub fn put(&self, key: &str, value: String) -> Result<(), PrivateBoxError> {
        self.0.put_private(key.to_string(), value)
    }

    pub fn get(&self, key: &str) -> Result<Option<String>, PrivateBoxError> {
        self.0.get_private(key.to_string())
    }
}
