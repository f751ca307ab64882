//! Capabilities owned by the platform: keyring, private box, encryption and the payment sheet

pub mod encryptor;
pub mod keyring;
pub mod payment_sheet;
pub mod private_box;

uniffi::setup_scaffolding!();
