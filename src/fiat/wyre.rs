//! Wyre payment processor, order and transfer snapshots and their mapping onto [`FiatOrder`]

pub mod apple_pay;
pub mod client;
pub mod config;
pub mod reconcile;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::order::{FiatOrder, FiatOrderData, FiatOrderProvider, FiatOrderState, dest_to_address};

pub use client::{WYRE_CLIENT, WyreApi, WyreClient, WyreClientError};
pub use config::{WYRE_CONFIG, WyreConfig};
pub use reconcile::{Reconciliation, reconcile};

/// Order status as reported by `GET v3/orders/{id}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WyreOrderStatus {
    RunningChecks,
    Processing,
    Complete,
    Failed,

    #[serde(other)]
    Unknown,
}

impl From<&WyreOrderStatus> for FiatOrderState {
    fn from(status: &WyreOrderStatus) -> Self {
        match status {
            WyreOrderStatus::Complete => FiatOrderState::Completed,
            WyreOrderStatus::Failed => FiatOrderState::Cancelled,
            WyreOrderStatus::RunningChecks
            | WyreOrderStatus::Processing
            | WyreOrderStatus::Unknown => FiatOrderState::Pending,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WyreOrder {
    pub id: String,
    pub status: WyreOrderStatus,
    #[serde(default)]
    pub source_amount: Option<f64>,
    #[serde(default)]
    pub source_currency: Option<String>,
    #[serde(default)]
    pub dest_currency: Option<String>,
    #[serde(default)]
    pub dest: Option<String>,
    #[serde(default)]
    pub transfer_id: Option<String>,
    #[serde(default)]
    pub error_message: Option<String>,
}

/// Transfer as reported by `GET v2/transfer/{id}/track`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WyreTransfer {
    #[serde(default)]
    pub transfer_id: Option<String>,
    #[serde(default)]
    pub fee: Option<f64>,
    /// Fee per currency, keyed by currency code
    #[serde(default)]
    pub fees: HashMap<String, f64>,
    #[serde(default)]
    pub dest_amount: Option<f64>,
    #[serde(default)]
    pub dest_currency: Option<String>,
    #[serde(default)]
    pub blockchain_network_tx: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

/// Remote value along with the exact body it was parsed from
#[derive(Debug, Clone, PartialEq)]
pub struct Fetched<T> {
    pub value: T,
    pub raw: String,
}

impl WyreOrder {
    pub fn state(&self) -> FiatOrderState {
        FiatOrderState::from(&self.status)
    }

    /// Overlay the fields this snapshot owns, transfer derived fields are reset
    pub fn overlay_onto(&self, order: &mut FiatOrder) {
        order.id = self.id.as_str().into();
        order.amount = self.source_amount;
        order.fee = None;
        order.crypto_amount = None;
        order.crypto_fee = None;
        order.currency = self.source_currency.clone();
        order.cryptocurrency = self.dest_currency.clone();
        order.state = self.state();
        order.tx_hash = None;

        if let Some(dest) = &self.dest {
            order.account = dest_to_address(dest).to_string();
        }
    }

    /// New local order for a freshly created remote order
    pub fn to_fiat_order(
        &self,
        provider: FiatOrderProvider,
        network: &str,
        raw: String,
    ) -> FiatOrder {
        let account = self.dest.as_deref().map(dest_to_address).unwrap_or_default();
        let mut order = FiatOrder::pending(self.id.as_str(), provider, network, account);

        self.overlay_onto(&mut order);
        order.data = Some(FiatOrderData { order: raw, transfer: None });

        order
    }
}

impl WyreTransfer {
    pub fn crypto_fee(&self) -> Option<f64> {
        let dest_currency = self.dest_currency.as_ref()?;
        self.fees.get(dest_currency).copied()
    }

    /// Overlay the transfer derived fields, the order state is never touched
    pub fn overlay_onto(&self, order: &mut FiatOrder) {
        order.fee = self.fee;
        order.crypto_amount = self.dest_amount;
        order.crypto_fee = self.crypto_fee();
        order.tx_hash = self.blockchain_network_tx.clone();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn order_with_status(status: &str) -> WyreOrder {
        let json = format!(r#"{{"id":"WO_1","status":"{status}"}}"#);
        serde_json::from_str(&json).unwrap()
    }

    #[test]
    fn test_status_mapping_is_total() {
        assert_eq!(order_with_status("COMPLETE").state(), FiatOrderState::Completed);
        assert_eq!(order_with_status("FAILED").state(), FiatOrderState::Cancelled);
        assert_eq!(order_with_status("RUNNING_CHECKS").state(), FiatOrderState::Pending);
        assert_eq!(order_with_status("PROCESSING").state(), FiatOrderState::Pending);
        assert_eq!(order_with_status("SOMETHING_NEW").state(), FiatOrderState::Pending);
        assert_eq!(order_with_status("").state(), FiatOrderState::Pending);
    }

    #[test]
    fn test_order_overlay_resets_transfer_fields() {
        let remote: WyreOrder = serde_json::from_str(
            r#"{
                "id": "WO_1",
                "status": "PROCESSING",
                "sourceAmount": 10.59,
                "sourceCurrency": "USD",
                "destCurrency": "ETH",
                "dest": "ethereum:0xAbC"
            }"#,
        )
        .unwrap();

        let mut order = FiatOrder::pending("WO_1", FiatOrderProvider::WyreApplePay, "1", "0xold");
        order.tx_hash = Some("0xstale".into());
        order.fee = Some(1.0);

        remote.overlay_onto(&mut order);

        assert_eq!(order.amount, Some(10.59));
        assert_eq!(order.currency.as_deref(), Some("USD"));
        assert_eq!(order.cryptocurrency.as_deref(), Some("ETH"));
        assert_eq!(order.account, "0xAbC");
        assert_eq!(order.state, FiatOrderState::Pending);
        assert_eq!(order.tx_hash, None);
        assert_eq!(order.fee, None);
        assert_eq!(order.network, "1");
    }

    #[test]
    fn test_transfer_overlay() {
        let transfer: WyreTransfer = serde_json::from_str(
            r#"{
                "transferId": "TF_1",
                "fee": 0.59,
                "fees": { "USD": 0.59, "ETH": 0.0012 },
                "destAmount": 0.0042,
                "destCurrency": "ETH",
                "blockchainNetworkTx": "0xhash",
                "status": "COMPLETED"
            }"#,
        )
        .unwrap();

        let mut order = FiatOrder::pending("WO_1", FiatOrderProvider::WyreApplePay, "1", "0xabc");
        transfer.overlay_onto(&mut order);

        assert_eq!(order.fee, Some(0.59));
        assert_eq!(order.crypto_amount, Some(0.0042));
        assert_eq!(order.crypto_fee, Some(0.0012));
        assert_eq!(order.tx_hash.as_deref(), Some("0xhash"));
        assert_eq!(order.state, FiatOrderState::Pending);
    }

    #[test]
    fn test_crypto_fee_missing_currency() {
        let transfer: WyreTransfer =
            serde_json::from_str(r#"{ "fees": { "USD": 0.59 }, "destCurrency": "ETH" }"#).unwrap();

        assert_eq!(transfer.crypto_fee(), None);
    }
}
