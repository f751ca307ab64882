//! Fiat on-ramp orders: local order records, the Wyre processor and the pending order poller

pub mod order;
pub mod processor;
pub mod wyre;

pub use order::{FiatOrder, FiatOrderData, FiatOrderId, FiatOrderProvider, FiatOrderState};
