use serde::{Deserialize, Serialize};

use fern_macros::new_type;

/// Scheme prefix Wyre puts in front of ethereum destinations, e.g. `ethereum:0xabc`
pub const ETHEREUM_DEST_PREFIX: &str = "ethereum:";

new_type!(FiatOrderId, String);

#[derive(
    Debug,
    Clone,
    Copy,
    Hash,
    Eq,
    PartialEq,
    Default,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    uniffi::Enum,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum FiatOrderState {
    #[default]
    Pending,
    Completed,
    Cancelled,
    Failed,
}

#[derive(
    Debug,
    Clone,
    Copy,
    Hash,
    Eq,
    PartialEq,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    uniffi::Enum,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum FiatOrderProvider {
    Wyre,
    WyreApplePay,
}

/// Raw remote payloads kept for audit and debugging, as received
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, uniffi::Record)]
pub struct FiatOrderData {
    pub order: String,
    pub transfer: Option<String>,
}

/// Locally tracked fiat purchase
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, uniffi::Record)]
#[serde(rename_all = "camelCase")]
pub struct FiatOrder {
    pub id: FiatOrderId,
    pub provider: FiatOrderProvider,
    /// Chain id of the destination network, `"1"` is mainnet
    pub network: String,
    pub amount: Option<f64>,
    pub fee: Option<f64>,
    pub crypto_amount: Option<f64>,
    pub crypto_fee: Option<f64>,
    pub currency: Option<String>,
    pub cryptocurrency: Option<String>,
    pub state: FiatOrderState,
    pub account: String,
    pub tx_hash: Option<String>,
    pub data: Option<FiatOrderData>,
}

impl FiatOrder {
    pub fn pending(
        id: impl Into<FiatOrderId>,
        provider: FiatOrderProvider,
        network: impl Into<String>,
        account: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            provider,
            network: network.into(),
            amount: None,
            fee: None,
            crypto_amount: None,
            crypto_fee: None,
            currency: None,
            cryptocurrency: None,
            state: FiatOrderState::Pending,
            account: account.into(),
            tx_hash: None,
            data: None,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.state == FiatOrderState::Pending
    }
}

/// Strip the chain scheme from a destination to get the bare account address
pub fn dest_to_address(dest: &str) -> &str {
    dest.strip_prefix(ETHEREUM_DEST_PREFIX).unwrap_or(dest)
}

mod ffi {
    #[uniffi::export]
    fn fiat_order_dest_to_address(dest: String) -> String {
        super::dest_to_address(&dest).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_dest_to_address() {
        assert_eq!(dest_to_address("ethereum:0xABC"), "0xABC");
        assert_eq!(dest_to_address("0xABC"), "0xABC");

        // only the known prefix at the start is stripped
        assert_eq!(dest_to_address("bitcoin:bc1q"), "bitcoin:bc1q");
        assert_eq!(dest_to_address("0xABCethereum:"), "0xABCethereum:");
        assert_eq!(dest_to_address("ethereum:ethereum:0xABC"), "ethereum:0xABC");
    }

    #[test]
    fn test_order_serializes_with_screaming_enums() {
        let order =
            FiatOrder::pending("order-1", FiatOrderProvider::WyreApplePay, "1", "0xabc");
        let json = serde_json::to_value(&order).unwrap();

        assert_eq!(json["id"], "order-1");
        assert_eq!(json["provider"], "WYRE_APPLE_PAY");
        assert_eq!(json["state"], "PENDING");
        assert_eq!(json["txHash"], serde_json::Value::Null);

        let back: FiatOrder = serde_json::from_value(json).unwrap();
        assert_eq!(back, order);
    }

    #[test]
    fn test_state_display() {
        assert_eq!(FiatOrderState::Completed.to_string(), "COMPLETED");
        assert_eq!(FiatOrderProvider::WyreApplePay.to_string(), "WYRE_APPLE_PAY");
    }
}
