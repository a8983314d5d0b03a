//! Error taxonomy of the gateway core.

use cpgw_sdk::client::ClientError;
use thiserror::Error;

/// Errors surfaced by the gateway core.
///
/// API failures wrap [`ClientError`]; the caller decides whether a failure
/// is fatal (settings validation) or must be reported to the end user
/// (starting a payment). Webhook verification failures are deliberately not
/// errors — rejected notifications are dropped silently.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The configured credentials violate an invariant.
    #[error("invalid gateway credentials: {0}")]
    Credentials(&'static str),

    /// A call to the processor failed (transport, HTTP status, or decode).
    #[error("processor api call failed: {0}")]
    Api(#[from] ClientError),

    /// The requested fiat currency is unknown to the processor.
    #[error("currency {0} is not supported by the payment processor")]
    UnsupportedCurrency(String),

    /// The merchant invoice path returned an empty invoice list.
    #[error("processor returned no invoices")]
    EmptyInvoiceList,
}
