pub mod database;
pub mod fiat;
pub mod manager;
pub mod mnemonic_backup;
pub mod password;

pub(crate) mod logging;
pub(crate) mod unblock;

uniffi::setup_scaffolding!();
