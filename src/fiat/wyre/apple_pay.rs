//! Wyre checkout through the platform payment sheet (Apple Pay)

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, error, warn};

use fern_device::payment_sheet::{
    PaymentCompletion, PaymentContact, PaymentDetails, PaymentItem, PaymentMethodData,
    PaymentOptions, PaymentResponse, PaymentSheetAccess, PaymentSheetError, PaymentSheetRequest,
};

use super::{
    WyreApi, WyreClientError, WyreOrder, client::WYRE_CLIENT, config::WYRE_CONFIG,
    config::WyreConfig,
};
use crate::{
    database::Database,
    fiat::order::{ETHEREUM_DEST_PREFIX, FiatOrder, FiatOrderProvider},
};

const SOURCE_CURRENCY: &str = "USD";
const COUNTRY_CODE: &str = "US";
const SUPPORTED_NETWORKS: [&str; 3] = ["visa", "mastercard", "discover"];
const TOTAL_LABEL: &str = "Wyre (via Fern)";

#[derive(Debug, Clone, PartialEq, Eq, uniffi::Error, thiserror::Error)]
pub enum CheckoutError {
    /// Wyre rejected the order, fields are taken from the error body
    #[error("{message}")]
    Remote { message: String, error_type: Option<String>, exception_id: Option<String> },

    #[error("payment sheet returned an empty response")]
    EmptyPaymentResponse,

    #[error("payment sheet failed: {0}")]
    PaymentSheet(String),

    #[error("unable to submit order: {0}")]
    Request(String),

    #[error("unexpected status code {0}")]
    UnexpectedStatus(u16),

    #[error("unable to parse order response: {0}")]
    Parse(String),
}

impl From<WyreClientError> for CheckoutError {
    fn from(error: WyreClientError) -> Self {
        match error {
            WyreClientError::Status(status) => Self::UnexpectedStatus(status),
            WyreClientError::Parse(error) => Self::Parse(error),
            WyreClientError::Url(error) | WyreClientError::Request(error) => Self::Request(error),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WyreErrorBody {
    message: Option<String>,
    #[serde(rename = "type")]
    error_type: Option<String>,
    exception_id: Option<String>,
}

// MARK: Quote

#[derive(Debug, Clone, Copy, PartialEq, uniffi::Record)]
pub struct ApplePayQuote {
    pub amount: f64,
    pub fee_flat: f64,
    pub fee_percent: f64,
    pub percent_fee_amount: f64,
    pub fee: f64,
    pub total: f64,
}

impl ApplePayQuote {
    pub fn new(amount: f64, config: &WyreConfig) -> Self {
        let fee_flat = config.fee_flat();
        let fee_percent = config.fee_percent();

        let percent_fee_amount = round_cents(amount * fee_percent / 100.0);
        let fee = round_cents(percent_fee_amount + fee_flat);
        let total = round_cents(amount + fee);

        Self { amount, fee_flat, fee_percent, percent_fee_amount, fee, total }
    }
}

fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

pub fn format_amount(value: f64) -> String {
    format!("{value:.2}")
}

// MARK: Payload

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplePayOrderPayload {
    pub partner_id: String,
    pub payload: ApplePayOrderBody,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplePayOrderBody {
    pub order_request: WyreOrderRequest,
    pub payment_object: WyrePaymentObject,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WyreOrderRequest {
    pub amount: String,
    pub dest: String,
    pub dest_currency: String,
    pub referrer_account_id: String,
    pub source_currency: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WyrePaymentObject {
    pub billing_contact: WyreContact,
    pub shipping_contact: WyreContact,
    pub token: WyrePaymentToken,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WyreContact {
    pub address_lines: Vec<String>,
    pub administrative_area: String,
    pub country: String,
    pub country_code: String,
    pub family_name: String,
    pub given_name: String,
    pub locality: String,
    pub postal_code: String,
    pub sub_administrative_area: String,
    pub sub_locality: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
}

impl WyreContact {
    /// Billing contacts only carry the name and postal address
    pub fn billing(contact: &PaymentContact) -> Self {
        let address = &contact.postal_address;

        Self {
            address_lines: address.street.lines().map(str::to_string).collect(),
            administrative_area: address.state.clone(),
            country: address.country.clone(),
            country_code: address.iso_country_code.clone(),
            family_name: contact.family_name.clone(),
            given_name: contact.given_name.clone(),
            locality: address.city.clone(),
            postal_code: address.postal_code.clone(),
            sub_administrative_area: address.sub_administrative_area.clone(),
            sub_locality: address.sub_locality.clone(),
            email_address: None,
            phone_number: None,
        }
    }

    /// Shipping contacts carry the billing address plus the payer's email and phone
    pub fn shipping(billing: &PaymentContact, shipping: &PaymentContact) -> Self {
        Self {
            email_address: shipping.email_address.clone(),
            phone_number: shipping.phone_number.clone(),
            ..Self::billing(billing)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WyrePaymentToken {
    pub payment_data: serde_json::Value,
    pub payment_method: WyrePaymentMethod,
    pub transaction_identifier: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WyrePaymentMethod {
    pub display_name: String,
    pub network: String,
    #[serde(rename = "type")]
    pub method_type: String,
}

/// Any status from 200 up is a response, only 2xx is a created order
pub fn parse_checkout_response(status: u16, body: &str) -> Result<WyreOrder, CheckoutError> {
    if status < 200 {
        return Err(CheckoutError::UnexpectedStatus(status));
    }

    if (200..300).contains(&status) {
        return serde_json::from_str(body).map_err(|error| CheckoutError::Parse(error.to_string()));
    }

    let error_body: WyreErrorBody = serde_json::from_str(body).unwrap_or_default();
    Err(CheckoutError::Remote {
        message: error_body.message.unwrap_or_else(|| format!("wyre responded with {status}")),
        error_type: error_body.error_type,
        exception_id: error_body.exception_id,
    })
}

// MARK: Payment sheet

#[derive(Debug, Clone)]
pub struct PaymentSheet(Arc<Box<dyn PaymentSheetAccess>>);

impl PaymentSheet {
    pub fn from_access(sheet: Box<dyn PaymentSheetAccess>) -> Self {
        Self(Arc::new(sheet))
    }

    /// The platform call blocks until the user is done, so it runs on the blocking pool
    pub async fn show(
        &self,
        request: PaymentSheetRequest,
    ) -> Result<Option<PaymentResponse>, PaymentSheetError> {
        let sheet = self.0.clone();
        crate::unblock::run_blocking(move || sheet.show(request)).await
    }

    pub fn complete(&self, status: PaymentCompletion) {
        self.0.complete(status)
    }

    pub fn abort(&self) {
        self.0.abort()
    }
}

// MARK: Checkout

#[derive(Debug, Clone)]
pub struct ApplePayCheckout {
    config: WyreConfig,
    quote: ApplePayQuote,
    address: String,
    network: String,
    cryptocurrency: String,
}

impl ApplePayCheckout {
    pub fn new(
        config: WyreConfig,
        amount: f64,
        address: impl Into<String>,
        network: impl Into<String>,
        cryptocurrency: impl Into<String>,
    ) -> Self {
        let quote = ApplePayQuote::new(amount, &config);

        Self {
            config,
            quote,
            address: address.into(),
            network: network.into(),
            cryptocurrency: cryptocurrency.into(),
        }
    }

    pub fn quote(&self) -> ApplePayQuote {
        self.quote
    }

    pub fn payment_sheet_request(&self) -> PaymentSheetRequest {
        let method_data = PaymentMethodData {
            supported_methods: vec!["apple-pay".to_string()],
            supported_types: vec!["debit".to_string()],
            country_code: COUNTRY_CODE.to_string(),
            currency_code: SOURCE_CURRENCY.to_string(),
            supported_networks: SUPPORTED_NETWORKS.iter().map(|n| n.to_string()).collect(),
            merchant_identifier: self.config.merchant_id_for(&self.network).to_string(),
        };

        let item = |label: String, value: f64| PaymentItem {
            label,
            currency: SOURCE_CURRENCY.to_string(),
            value: format_amount(value),
        };

        let details = PaymentDetails {
            display_items: vec![
                item(format!("{} Purchase", self.cryptocurrency), self.quote.amount),
                item("Fee".to_string(), self.quote.fee),
            ],
            total: item(TOTAL_LABEL.to_string(), self.quote.total),
        };

        let options = PaymentOptions {
            request_payer_email: true,
            request_payer_phone: true,
            request_billing: true,
        };

        PaymentSheetRequest { method_data: vec![method_data], details, options }
    }

    pub fn create_payload(&self, response: &PaymentResponse) -> ApplePayOrderPayload {
        let account_id = self.config.account_id_for(&self.network).to_string();

        let order_request = WyreOrderRequest {
            amount: format_amount(self.quote.total),
            dest: format!("{ETHEREUM_DEST_PREFIX}{}", self.address),
            dest_currency: self.cryptocurrency.clone(),
            referrer_account_id: account_id.clone(),
            source_currency: SOURCE_CURRENCY.to_string(),
        };

        // the token is usually JSON, anything else is forwarded as a plain string
        let payment_data = serde_json::from_str(&response.payment_data)
            .unwrap_or_else(|_| serde_json::Value::String(response.payment_data.clone()));

        let payment_method = &response.payment_method;
        let token = WyrePaymentToken {
            payment_data,
            payment_method: WyrePaymentMethod {
                display_name: payment_method.display_name.clone(),
                network: payment_method.network.clone(),
                method_type: "debit".to_string(),
            },
            transaction_identifier: response.transaction_identifier.clone(),
        };

        let payment_object = WyrePaymentObject {
            billing_contact: WyreContact::billing(&response.billing_contact),
            shipping_contact: WyreContact::shipping(
                &response.billing_contact,
                &response.shipping_contact,
            ),
            token,
        };

        ApplePayOrderPayload {
            partner_id: account_id,
            payload: ApplePayOrderBody { order_request, payment_object },
        }
    }

    /// Show the payment sheet and submit the order once the user confirms
    ///
    /// Returns `Ok(None)` when the user dismisses the sheet
    pub async fn checkout(
        &self,
        api: &dyn WyreApi,
        sheet: &PaymentSheet,
    ) -> Result<Option<FiatOrder>, CheckoutError> {
        let response = match sheet.show(self.payment_sheet_request()).await {
            Ok(Some(response)) => response,
            Ok(None) => {
                sheet.abort();
                return Err(CheckoutError::EmptyPaymentResponse);
            }
            Err(PaymentSheetError::Aborted) => {
                debug!("payment sheet dismissed by the user");
                return Ok(None);
            }
            Err(error) => {
                sheet.abort();
                return Err(CheckoutError::PaymentSheet(error.to_string()));
            }
        };

        let payload = self.create_payload(&response);
        let response = match api.create_apple_pay_order(&self.network, &payload).await {
            Ok(response) => response,
            Err(error) => {
                warn!("unable to submit apple pay order: {error}");
                sheet.abort();
                return Err(error.into());
            }
        };

        match parse_checkout_response(response.status, &response.body) {
            Ok(remote) => {
                sheet.complete(PaymentCompletion::Success);

                let provider = FiatOrderProvider::WyreApplePay;
                let order = remote.to_fiat_order(provider, &self.network, response.body);

                Ok(Some(order))
            }
            Err(error) => {
                warn!("wyre rejected apple pay order: {error:?}");

                if response.status >= 200 {
                    sheet.complete(PaymentCompletion::Fail);
                }

                sheet.abort();
                Err(error)
            }
        }
    }
}

// MARK: FFI

#[derive(Debug, Clone, uniffi::Object)]
pub struct RustApplePayCheckout(ApplePayCheckout);

#[uniffi::export(async_runtime = "tokio")]
impl RustApplePayCheckout {
    #[uniffi::constructor]
    pub fn new(amount: f64, address: String, network: String, cryptocurrency: String) -> Self {
        Self(ApplePayCheckout::new(WYRE_CONFIG.clone(), amount, address, network, cryptocurrency))
    }

    pub fn quote(&self) -> ApplePayQuote {
        self.0.quote()
    }

    pub fn payment_sheet_request(&self) -> PaymentSheetRequest {
        self.0.payment_sheet_request()
    }

    /// Runs the checkout and starts tracking the created order
    pub async fn checkout(
        &self,
        sheet: Box<dyn PaymentSheetAccess>,
    ) -> Result<Option<FiatOrder>, CheckoutError> {
        let sheet = PaymentSheet::from_access(sheet);
        let order = self.0.checkout(&*WYRE_CLIENT, &sheet).await?;

        if let Some(order) = &order {
            if let Err(error) = Database::global().fiat_orders.save(order) {
                error!("unable to save fiat order {}: {error}", order.id);
            }
        }

        Ok(order)
    }
}

#[uniffi::export]
fn format_fiat_amount(value: f64) -> String {
    format_amount(value)
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::fiat::{
        FiatOrderState,
        wyre::{
            client::WyreResponse,
            config::{WYRE_MERCHANT_ID_TEST, WyreConfig},
            reconcile::tests::{FakeWyreApi, ORDER_PROCESSING},
        },
    };
    use fern_device::payment_sheet::{PaymentMethod, PostalAddress};

    #[derive(Debug)]
    struct FakeSheet {
        show: Result<Option<PaymentResponse>, PaymentSheetError>,
        calls: Arc<Mutex<Vec<String>>>,
    }

    impl PaymentSheetAccess for FakeSheet {
        fn show(
            &self,
            request: PaymentSheetRequest,
        ) -> Result<Option<PaymentResponse>, PaymentSheetError> {
            let total = &request.details.total.value;
            self.calls.lock().unwrap().push(format!("show:{total}"));
            self.show.clone()
        }

        fn complete(&self, status: PaymentCompletion) {
            self.calls.lock().unwrap().push(format!("complete:{status:?}"));
        }

        fn abort(&self) {
            self.calls.lock().unwrap().push("abort".to_string());
        }
    }

    fn sheet(
        show: Result<Option<PaymentResponse>, PaymentSheetError>,
    ) -> (PaymentSheet, Arc<Mutex<Vec<String>>>) {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let sheet = PaymentSheet::from_access(Box::new(FakeSheet { show, calls: calls.clone() }));
        (sheet, calls)
    }

    fn payment_response() -> PaymentResponse {
        let postal_address = PostalAddress {
            street: "1 Main St\nApt 2".to_string(),
            city: "Springfield".to_string(),
            state: "IL".to_string(),
            postal_code: "62701".to_string(),
            country: "United States".to_string(),
            iso_country_code: "US".to_string(),
            sub_administrative_area: String::new(),
            sub_locality: String::new(),
        };

        let billing_contact = PaymentContact {
            given_name: "Sam".to_string(),
            family_name: "Doe".to_string(),
            postal_address,
            email_address: None,
            phone_number: None,
        };

        let shipping_contact = PaymentContact {
            email_address: Some("sam@example.com".to_string()),
            phone_number: Some("+15555550100".to_string()),
            ..PaymentContact::default()
        };

        PaymentResponse {
            billing_contact,
            shipping_contact,
            payment_data: r#"{"version":"EC_v1","data":"abc"}"#.to_string(),
            payment_method: PaymentMethod {
                display_name: "Visa 1234".to_string(),
                network: "Visa".to_string(),
                method_type: "credit".to_string(),
            },
            transaction_identifier: "txn-1".to_string(),
        }
    }

    fn test_config() -> WyreConfig {
        WyreConfig {
            account_id: "AC_MAIN".to_string(),
            test_account_id: "AC_TEST".to_string(),
            ..WyreConfig::default()
        }
    }

    fn checkout() -> ApplePayCheckout {
        ApplePayCheckout::new(test_config(), 10.0, "0xAbC", "1", "ETH")
    }

    #[test]
    fn test_quote_fees() {
        let quote = ApplePayQuote::new(10.0, &WyreConfig::default());

        assert_eq!(quote.percent_fee_amount, 0.29);
        assert_eq!(quote.fee, 0.59);
        assert_eq!(quote.total, 10.59);
        assert_eq!(format_amount(quote.total), "10.59");

        let quote = ApplePayQuote::new(100.0, &WyreConfig::default());
        assert_eq!(format_amount(quote.fee), "3.20");
        assert_eq!(format_amount(quote.total), "103.20");
    }

    #[test]
    fn test_quote_promotion() {
        let config = WyreConfig { is_promotion: true, ..WyreConfig::default() };
        let quote = ApplePayQuote::new(25.5, &config);

        assert_eq!(quote.fee, 0.0);
        assert_eq!(format_amount(quote.fee), "0.00");
        assert_eq!(quote.total, 25.5);
    }

    #[test]
    fn test_payment_sheet_request() {
        let request = checkout().payment_sheet_request();

        let method = &request.method_data[0];
        assert_eq!(method.supported_methods, vec!["apple-pay"]);
        assert_eq!(method.supported_types, vec!["debit"]);
        assert_eq!(method.merchant_identifier, WYRE_MERCHANT_ID_TEST);

        let labels: Vec<_> = request.details.display_items.iter().map(|i| &i.label).collect();
        assert_eq!(labels, vec!["ETH Purchase", "Fee"]);
        assert_eq!(request.details.display_items[0].value, "10.00");
        assert_eq!(request.details.display_items[1].value, "0.59");
        assert_eq!(request.details.total.value, "10.59");
        assert_eq!(request.details.total.label, TOTAL_LABEL);
        assert!(request.options.request_billing);
    }

    #[test]
    fn test_create_payload() {
        let payload = checkout().create_payload(&payment_response());
        let json = serde_json::to_value(&payload).unwrap();

        assert_eq!(json["partnerId"], "AC_MAIN");

        let order_request = &json["payload"]["orderRequest"];
        assert_eq!(order_request["amount"], "10.59");
        assert_eq!(order_request["dest"], "ethereum:0xAbC");
        assert_eq!(order_request["destCurrency"], "ETH");
        assert_eq!(order_request["referrerAccountId"], "AC_MAIN");
        assert_eq!(order_request["sourceCurrency"], "USD");

        let payment_object = &json["payload"]["paymentObject"];
        let billing = &payment_object["billingContact"];
        assert_eq!(billing["addressLines"], serde_json::json!(["1 Main St", "Apt 2"]));
        assert_eq!(billing["locality"], "Springfield");
        assert_eq!(billing["countryCode"], "US");
        assert!(billing.get("emailAddress").is_none());

        let shipping = &payment_object["shippingContact"];
        assert_eq!(shipping["emailAddress"], "sam@example.com");
        assert_eq!(shipping["phoneNumber"], "+15555550100");
        assert_eq!(shipping["givenName"], "Sam");

        let token = &payment_object["token"];
        assert_eq!(token["paymentData"]["version"], "EC_v1");
        assert_eq!(token["paymentMethod"]["type"], "debit");
        assert_eq!(token["transactionIdentifier"], "txn-1");
    }

    #[test]
    fn test_payload_uses_test_account_off_mainnet() {
        let checkout = ApplePayCheckout::new(test_config(), 10.0, "0xAbC", "4", "ETH");
        let payload = checkout.create_payload(&payment_response());

        assert_eq!(payload.partner_id, "AC_TEST");
    }

    #[test]
    fn test_parse_checkout_response() {
        let order = parse_checkout_response(201, ORDER_PROCESSING).unwrap();
        assert_eq!(order.id, "WO_1");

        let body = r#"{"message":"card declined","type":"PaymentException","exceptionId":"X1"}"#;
        assert_eq!(
            parse_checkout_response(400, body),
            Err(CheckoutError::Remote {
                message: "card declined".to_string(),
                error_type: Some("PaymentException".to_string()),
                exception_id: Some("X1".to_string()),
            })
        );

        let error = parse_checkout_response(502, "bad gateway").unwrap_err();
        assert!(matches!(error, CheckoutError::Remote { error_type: None, .. }));

        assert_eq!(parse_checkout_response(101, ""), Err(CheckoutError::UnexpectedStatus(101)));
    }

    #[tokio::test]
    async fn test_checkout_success() {
        let api = FakeWyreApi {
            checkout: Some(Ok(WyreResponse { status: 201, body: ORDER_PROCESSING.to_string() })),
            ..Default::default()
        };

        let (sheet, calls) = sheet(Ok(Some(payment_response())));
        let order = checkout().checkout(&api, &sheet).await.unwrap().unwrap();

        assert_eq!(order.id.as_ref(), "WO_1");
        assert_eq!(order.provider, FiatOrderProvider::WyreApplePay);
        assert_eq!(order.network, "1");
        assert_eq!(order.state, FiatOrderState::Pending);
        assert_eq!(order.account, "0xAbC");
        assert_eq!(order.amount, Some(10.59));

        assert_eq!(*calls.lock().unwrap(), vec!["show:10.59", "complete:Success"]);
        assert_eq!(*api.calls.lock().unwrap(), vec!["checkout:1"]);
        assert_eq!(api.payloads.lock().unwrap()[0].payload.order_request.amount, "10.59");
    }

    #[tokio::test]
    async fn test_checkout_remote_error() {
        let body = r#"{"message":"limit exceeded","type":"LimitException","exceptionId":"E9"}"#;
        let api = FakeWyreApi {
            checkout: Some(Ok(WyreResponse { status: 400, body: body.to_string() })),
            ..Default::default()
        };

        let (sheet, calls) = sheet(Ok(Some(payment_response())));
        let error = checkout().checkout(&api, &sheet).await.unwrap_err();

        assert_eq!(
            error,
            CheckoutError::Remote {
                message: "limit exceeded".to_string(),
                error_type: Some("LimitException".to_string()),
                exception_id: Some("E9".to_string()),
            }
        );
        assert_eq!(*calls.lock().unwrap(), vec!["show:10.59", "complete:Fail", "abort"]);
    }

    #[tokio::test]
    async fn test_checkout_cancelled_by_user() {
        let api = FakeWyreApi::default();
        let (sheet, calls) = sheet(Err(PaymentSheetError::Aborted));

        let result = checkout().checkout(&api, &sheet).await;

        assert_eq!(result, Ok(None));
        assert_eq!(*calls.lock().unwrap(), vec!["show:10.59"]);
        assert!(api.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_checkout_empty_payment_response() {
        let api = FakeWyreApi::default();
        let (sheet, calls) = sheet(Ok(None));

        let result = checkout().checkout(&api, &sheet).await;

        assert_eq!(result, Err(CheckoutError::EmptyPaymentResponse));
        assert_eq!(*calls.lock().unwrap(), vec!["show:10.59", "abort"]);
    }

    #[tokio::test]
    async fn test_checkout_request_failure_aborts_sheet() {
        let api = FakeWyreApi {
            checkout: Some(Err(WyreClientError::Request("operation timed out".into()))),
            ..Default::default()
        };

        let (sheet, calls) = sheet(Ok(Some(payment_response())));
        let result = checkout().checkout(&api, &sheet).await;

        assert_eq!(result, Err(CheckoutError::Request("operation timed out".into())));
        assert_eq!(*calls.lock().unwrap(), vec!["show:10.59", "abort"]);
    }
}
