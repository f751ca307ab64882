use std::sync::Arc;

use redb::{ReadableTable as _, TableDefinition};
use tracing::{debug, warn};

use super::Error;
use crate::fiat::FiatOrder;

/// Orders keyed by the provider order id, stored as JSON
pub const TABLE: TableDefinition<&'static str, String> = TableDefinition::new("fiat_orders");

type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Clone, uniffi::Object)]
pub struct FiatOrdersTable {
    db: Arc<redb::Database>,
}

#[derive(Debug, Clone, Hash, Eq, PartialEq, uniffi::Error, thiserror::Error)]
pub enum FiatOrdersTableError {
    #[error("failed to save fiat order: {0}")]
    Save(String),

    #[error("failed to get fiat order: {0}")]
    Read(String),

    #[error("failed to serialize or deserialize fiat order: {0}")]
    Serde(String),
}

impl FiatOrdersTable {
    pub fn new(db: Arc<redb::Database>, write_txn: &redb::WriteTransaction) -> Result<Self> {
        // create table if it doesn't exist
        write_txn.open_table(TABLE)?;

        Ok(Self { db })
    }

    /// Insert or replace the order with the same id
    pub fn save(&self, order: &FiatOrder) -> Result<()> {
        let json = serde_json::to_string(order)
            .map_err(|error| FiatOrdersTableError::Serde(error.to_string()))?;

        let write_txn = self.db.begin_write()?;

        {
            let mut table = write_txn.open_table(TABLE)?;
            table
                .insert(order.id.as_ref(), json)
                .map_err(|error| FiatOrdersTableError::Save(error.to_string()))?;
        }

        write_txn.commit()?;
        debug!("saved fiat order {} ({})", order.id, order.state);

        Ok(())
    }
}

#[uniffi::export]
impl FiatOrdersTable {
    pub fn get(&self, id: &str) -> Result<Option<FiatOrder>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(TABLE)?;

        let Some(json) = table
            .get(id)
            .map_err(|error| FiatOrdersTableError::Read(error.to_string()))?
            .map(|value| value.value())
        else {
            return Ok(None);
        };

        let order = parse_order(&json)?;
        Ok(Some(order))
    }

    /// All tracked orders ordered by id, rows that no longer parse are skipped
    pub fn orders(&self) -> Result<Vec<FiatOrder>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(TABLE)?;

        let rows = table.iter().map_err(|error| FiatOrdersTableError::Read(error.to_string()))?;

        let mut orders = Vec::new();
        for row in rows {
            let (id, json) = row.map_err(|error| FiatOrdersTableError::Read(error.to_string()))?;

            match parse_order(&json.value()) {
                Ok(order) => orders.push(order),
                Err(error) => warn!("skipping unreadable fiat order {}: {error}", id.value()),
            }
        }

        Ok(orders)
    }

    pub fn pending_orders(&self) -> Result<Vec<FiatOrder>> {
        let orders = self.orders()?;
        Ok(orders.into_iter().filter(FiatOrder::is_pending).collect())
    }

    pub fn delete(&self, id: &str) -> Result<()> {
        let write_txn = self.db.begin_write()?;

        {
            let mut table = write_txn.open_table(TABLE)?;
            table.remove(id).map_err(|error| FiatOrdersTableError::Save(error.to_string()))?;
        }

        write_txn.commit()?;

        Ok(())
    }
}

fn parse_order(json: &str) -> Result<FiatOrder, FiatOrdersTableError> {
    serde_json::from_str(json).map_err(|error| FiatOrdersTableError::Serde(error.to_string()))
}
