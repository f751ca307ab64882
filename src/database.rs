//! Module for interacting with redb database, to store local state that is persisted across app
//! launches: the local mnemonic backup copy and the tracked fiat orders.

pub mod error;
pub mod fiat_orders;
pub mod local_storage;

use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use fiat_orders::FiatOrdersTable;
use local_storage::LocalStorageTable;

use once_cell::sync::OnceCell;
use tracing::{error, info};

use fern_common::consts::ROOT_DATA_DIR;

pub static DATABASE: OnceCell<Database> = OnceCell::new();

pub type Error = error::DatabaseError;

#[derive(Debug, Clone, uniffi::Object)]
pub struct Database {
    pub local_storage: LocalStorageTable,
    pub fiat_orders: FiatOrdersTable,
}

#[uniffi::export]
impl Database {
    #[uniffi::constructor(name = "new")]
    pub fn new() -> Self {
        Self::global().clone()
    }

    pub fn local_storage(&self) -> LocalStorageTable {
        self.local_storage.clone()
    }
}

impl Default for Database {
    fn default() -> Self {
        Self::new()
    }
}

impl Database {
    /// Returns the global database, opening it on first access
    ///
    /// # Panics
    ///
    /// Panics if the database file can not be created
    pub fn global() -> &'static Database {
        DATABASE.get_or_init(|| {
            Self::open(&database_location()).expect("failed to open or create the database")
        })
    }

    /// Open the database at `location`, creating the file and tables if needed
    pub fn open(location: &Path) -> Result<Self, Error> {
        let db = get_or_create_database(location)?;

        let write_txn = db.begin_write()?;
        let db = Arc::new(db);

        let local_storage = LocalStorageTable::new(db.clone(), &write_txn)?;
        let fiat_orders = FiatOrdersTable::new(db.clone(), &write_txn)?;

        write_txn.commit()?;

        Ok(Self { local_storage, fiat_orders })
    }
}

fn get_or_create_database(location: &Path) -> Result<redb::Database, Error> {
    if location.exists() {
        match redb::Database::open(location) {
            Ok(db) => return Ok(db),
            Err(error) => {
                error!("failed to open database, error: {error:?}, creating a new one");
            }
        }
    };

    info!("Creating a new database, at {}", location.display());

    let db = redb::Database::create(location)?;
    Ok(db)
}

fn database_location() -> PathBuf {
    ROOT_DATA_DIR.join("fern.db")
}
