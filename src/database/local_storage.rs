use std::sync::Arc;

use redb::TableDefinition;
use tracing::debug;

use super::Error;

pub const TABLE: TableDefinition<&'static str, String> = TableDefinition::new("local_storage");

type Result<T, E = Error> = std::result::Result<T, E>;

/// On device key value storage, keys are expected to be namespaced by the caller
#[derive(Debug, Clone, uniffi::Object)]
pub struct LocalStorageTable {
    db: Arc<redb::Database>,
}

#[derive(Debug, Clone, Hash, Eq, PartialEq, uniffi::Error, thiserror::Error)]
pub enum LocalStorageTableError {
    #[error("failed to save item: {0}")]
    Save(String),

    #[error("failed to get item: {0}")]
    Read(String),
}

impl LocalStorageTable {
    pub fn new(db: Arc<redb::Database>, write_txn: &redb::WriteTransaction) -> Result<Self> {
        // create table if it doesn't exist
        write_txn.open_table(TABLE)?;

        Ok(Self { db })
    }
}

#[uniffi::export]
impl LocalStorageTable {
    pub fn get_item(&self, key: &str) -> Result<Option<String>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(TABLE)?;

        let value = table
            .get(key)
            .map_err(|error| LocalStorageTableError::Read(error.to_string()))?
            .map(|value| value.value());

        Ok(value)
    }

    pub fn set_item(&self, key: &str, value: String) -> Result<()> {
        let write_txn = self.db.begin_write()?;

        {
            let mut table = write_txn.open_table(TABLE)?;
            table
                .insert(key, value)
                .map_err(|error| LocalStorageTableError::Save(error.to_string()))?;
        }

        write_txn.commit()?;
        debug!("saved local item {key}");

        Ok(())
    }

    pub fn remove_item(&self, key: &str) -> Result<()> {
        let write_txn = self.db.begin_write()?;

        {
            let mut table = write_txn.open_table(TABLE)?;
            table
                .remove(key)
                .map_err(|error| LocalStorageTableError::Save(error.to_string()))?;
        }

        write_txn.commit()?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::database::test_util::temp_database;

    #[test]
    fn test_set_overwrites_and_remove_clears() {
        let (db, _dir) = temp_database();
        let storage = db.local_storage;

        assert_eq!(storage.get_item("@Fern:key").unwrap(), None);

        storage.set_item("@Fern:key", "first".to_string()).unwrap();
        storage.set_item("@Fern:key", "second".to_string()).unwrap();
        assert_eq!(storage.get_item("@Fern:key").unwrap().as_deref(), Some("second"));

        storage.remove_item("@Fern:key").unwrap();
        assert_eq!(storage.get_item("@Fern:key").unwrap(), None);
    }
}
