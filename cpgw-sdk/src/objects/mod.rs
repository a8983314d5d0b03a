//! Request and response objects for the CoinPayments v1 API.

pub mod currency;
pub mod invoice;
pub mod webhook;

pub use currency::{CurrencyInfo, CurrencyList};
pub use invoice::{
    BuyerProfile, Invoice, InvoiceAllocation, InvoiceDetail, InvoiceMetadata, InvoiceRequest,
    MerchantInvoices,
};
pub use webhook::{
    WebhookInfo, WebhookList, WebhookNotification, WebhookRegistration, CANCELLED_EVENT,
    PAID_EVENT,
};
