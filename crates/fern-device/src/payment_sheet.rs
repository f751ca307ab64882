//! Platform payment sheet, i.e. the Apple Pay sheet on iOS

#[derive(Debug, Clone, Hash, Eq, PartialEq, uniffi::Error, thiserror::Error)]
pub enum PaymentSheetError {
    /// The user dismissed the sheet
    #[error("payment sheet was aborted")]
    Aborted,

    #[error("payment sheet failed: {0}")]
    Failed(String),

    #[error("unexpected payment sheet error: {0}")]
    Unexpected(String),
}

impl From<uniffi::UnexpectedUniFFICallbackError> for PaymentSheetError {
    fn from(error: uniffi::UnexpectedUniFFICallbackError) -> Self {
        Self::Unexpected(error.reason)
    }
}

#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, uniffi::Enum)]
pub enum PaymentCompletion {
    Success,
    Fail,
}

#[derive(Debug, Clone, PartialEq, Eq, uniffi::Record)]
pub struct PaymentMethodData {
    pub supported_methods: Vec<String>,
    pub supported_types: Vec<String>,
    pub country_code: String,
    pub currency_code: String,
    pub supported_networks: Vec<String>,
    pub merchant_identifier: String,
}

#[derive(Debug, Clone, PartialEq, Eq, uniffi::Record)]
pub struct PaymentItem {
    pub label: String,
    pub currency: String,
    /// Amount with two decimals, e.g. `10.59`
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, uniffi::Record)]
pub struct PaymentDetails {
    pub display_items: Vec<PaymentItem>,
    pub total: PaymentItem,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, uniffi::Record)]
pub struct PaymentOptions {
    pub request_payer_email: bool,
    pub request_payer_phone: bool,
    pub request_billing: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, uniffi::Record)]
pub struct PaymentSheetRequest {
    pub method_data: Vec<PaymentMethodData>,
    pub details: PaymentDetails,
    pub options: PaymentOptions,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, uniffi::Record)]
pub struct PostalAddress {
    /// Street lines separated by newlines
    pub street: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub country: String,
    pub iso_country_code: String,
    pub sub_administrative_area: String,
    pub sub_locality: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, uniffi::Record)]
pub struct PaymentContact {
    pub given_name: String,
    pub family_name: String,
    pub postal_address: PostalAddress,
    pub email_address: Option<String>,
    pub phone_number: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, uniffi::Record)]
pub struct PaymentMethod {
    pub display_name: String,
    pub network: String,
    pub method_type: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, uniffi::Record)]
pub struct PaymentResponse {
    pub billing_contact: PaymentContact,
    pub shipping_contact: PaymentContact,
    /// Opaque payment token as returned by the platform, usually a JSON document
    pub payment_data: String,
    pub payment_method: PaymentMethod,
    pub transaction_identifier: String,
}

#[uniffi::export(callback_interface)]
pub trait PaymentSheetAccess: Send + Sync + std::fmt::Debug + 'static {
    /// Present the sheet and block until the user confirms or dismisses it
    ///
    /// A dismissal is reported as [`PaymentSheetError::Aborted`]
    fn show(
        &self,
        request: PaymentSheetRequest,
    ) -> Result<Option<PaymentResponse>, PaymentSheetError>;

    /// Close a confirmed sheet with the final payment status
    fn complete(&self, status: PaymentCompletion);

    /// Tear down the sheet after a failure
    fn abort(&self);
}
