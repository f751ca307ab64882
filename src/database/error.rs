use super::{fiat_orders::FiatOrdersTableError, local_storage::LocalStorageTableError};

type Error = DatabaseError;

#[derive(Debug, Clone, Hash, Eq, PartialEq, uniffi::Error, thiserror::Error)]
pub enum DatabaseError {
    #[error("failed to open database: {0}")]
    DatabaseAccess(String),

    #[error("failed to open table: {0}")]
    TableAccess(String),

    #[error(transparent)]
    LocalStorage(#[from] LocalStorageTableError),

    #[error(transparent)]
    FiatOrders(#[from] FiatOrdersTableError),
}

impl From<redb::DatabaseError> for Error {
    fn from(error: redb::DatabaseError) -> Self {
        Self::DatabaseAccess(error.to_string())
    }
}

impl From<redb::TransactionError> for Error {
    fn from(error: redb::TransactionError) -> Self {
        Self::DatabaseAccess(error.to_string())
    }
}

impl From<redb::CommitError> for Error {
    fn from(error: redb::CommitError) -> Self {
        Self::DatabaseAccess(error.to_string())
    }
}

impl From<redb::TableError> for Error {
    fn from(error: redb::TableError) -> Self {
        Self::TableAccess(error.to_string())
    }
}

impl From<redb::StorageError> for Error {
    fn from(error: redb::StorageError) -> Self {
        Self::TableAccess(error.to_string())
    }
}
