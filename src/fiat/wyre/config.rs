use std::{sync::LazyLock, time::Duration};

pub const WYRE_API_ENDPOINT: &str = "https://api.sendwyre.com/";
pub const WYRE_API_ENDPOINT_TEST: &str = "https://api.testwyre.com/";

pub const WYRE_MERCHANT_ID: &str = "merchant.app.fern.wyre";
pub const WYRE_MERCHANT_ID_TEST: &str = "merchant.app.fern.wyre.test";

pub const WYRE_FEE_PERCENT: f64 = 2.9;
pub const WYRE_FEE_FLAT: f64 = 0.30;

/// Wyre's apple pay endpoint can hang well past its own gateway timeout
pub const CHECKOUT_TIMEOUT: Duration = Duration::from_secs(25);

/// Chain id of ethereum mainnet, every other network goes to the test environment
pub const MAINNET_NETWORK: &str = "1";

const WYRE_ACCOUNT_ID: &str = match option_env!("FERN_WYRE_ACCOUNT_ID") {
    Some(id) => id,
    None => "",
};

const WYRE_ACCOUNT_ID_TEST: &str = match option_env!("FERN_WYRE_ACCOUNT_ID_TEST") {
    Some(id) => id,
    None => "",
};

pub static WYRE_CONFIG: LazyLock<WyreConfig> = LazyLock::new(WyreConfig::default);

#[derive(Debug, Clone, PartialEq)]
pub struct WyreConfig {
    pub api_endpoint: String,
    pub test_api_endpoint: String,
    pub account_id: String,
    pub test_account_id: String,
    pub merchant_id: String,
    pub test_merchant_id: String,

    /// Waives both the flat and percentage fee
    pub is_promotion: bool,
    pub fee_percent: f64,
    pub fee_flat: f64,

    pub checkout_timeout: Duration,
    pub is_development: bool,

    /// The environment check this was ported from always resolved to the test merchant,
    /// kept on until the production merchant is confirmed
    pub always_use_test_merchant: bool,
}

impl Default for WyreConfig {
    fn default() -> Self {
        Self {
            api_endpoint: WYRE_API_ENDPOINT.to_string(),
            test_api_endpoint: WYRE_API_ENDPOINT_TEST.to_string(),
            account_id: WYRE_ACCOUNT_ID.to_string(),
            test_account_id: WYRE_ACCOUNT_ID_TEST.to_string(),
            merchant_id: WYRE_MERCHANT_ID.to_string(),
            test_merchant_id: WYRE_MERCHANT_ID_TEST.to_string(),
            is_promotion: false,
            fee_percent: WYRE_FEE_PERCENT,
            fee_flat: WYRE_FEE_FLAT,
            checkout_timeout: CHECKOUT_TIMEOUT,
            is_development: cfg!(debug_assertions),
            always_use_test_merchant: true,
        }
    }
}

impl WyreConfig {
    pub fn is_mainnet(network: &str) -> bool {
        network == MAINNET_NETWORK
    }

    pub fn api_endpoint_for(&self, network: &str) -> &str {
        if Self::is_mainnet(network) { &self.api_endpoint } else { &self.test_api_endpoint }
    }

    pub fn account_id_for(&self, network: &str) -> &str {
        if Self::is_mainnet(network) { &self.account_id } else { &self.test_account_id }
    }

    pub fn merchant_id_for(&self, network: &str) -> &str {
        let use_test = self.always_use_test_merchant || self.is_development;

        if Self::is_mainnet(network) && !use_test {
            &self.merchant_id
        } else {
            &self.test_merchant_id
        }
    }

    pub fn fee_percent(&self) -> f64 {
        if self.is_promotion { 0.0 } else { self.fee_percent }
    }

    pub fn fee_flat(&self) -> f64 {
        if self.is_promotion { 0.0 } else { self.fee_flat }
    }
}
