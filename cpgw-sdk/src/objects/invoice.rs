//! Invoice creation and lookup objects.
//!
//! One canonical parameter object ([`InvoiceRequest`]) covers both the
//! unsigned "simple" path and the signed "merchant" path; the only wire
//! difference is that the simple path carries `clientId` in the body.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A per-invoice amount allocation, carried in `custom.amounts` on creation
/// and recovered from `customData.amounts` on lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceAllocation {
    pub id: String,
    pub amount: Decimal,
}

/// Integration metadata attached to every created invoice.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvoiceMetadata {
    /// Integration label, `"<product>_v<version>"`.
    pub integration: String,
    /// The callback host of this installation.
    pub hostname: String,
}

/// Buyer billing profile supplied by the billing platform.
///
/// Email and address are conditionally forwarded to the processor, see
/// [`BuyerProfile::wire`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BuyerProfile {
    pub company: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub email: String,
    pub address_1: String,
    pub address_2: String,
    pub city: String,
    pub state: String,
    /// 2-letter uppercase ISO country code; anything else suppresses the
    /// address block.
    pub country: String,
    pub postcode: String,
}

impl BuyerProfile {
    /// Whether the email is plausible enough to forward (`.*@.*`).
    fn email_accepted(&self) -> bool {
        let mut parts = self.email.splitn(2, '@');
        parts.next().is_some() && parts.next().is_some()
    }

    /// Whether the address block is complete enough to forward: address
    /// line 1 and city non-empty, country exactly two uppercase letters.
    fn address_accepted(&self) -> bool {
        !self.address_1.is_empty()
            && !self.city.is_empty()
            && self.country.len() == 2
            && self.country.chars().all(|c| c.is_ascii_uppercase())
    }

    /// Project into the processor's buyer object, applying the email and
    /// address acceptance rules.
    pub fn wire(&self) -> BuyerBody {
        BuyerBody {
            company_name: self.company.clone(),
            name: BuyerName {
                first_name: self.first_name.clone(),
                last_name: self.last_name.clone(),
            },
            phone_number: self.phone.clone(),
            email_address: self.email_accepted().then(|| self.email.clone()),
            address: self.address_accepted().then(|| BuyerAddress {
                address_1: self.address_1.clone(),
                address_2: self.address_2.clone(),
                province_or_state: self.state.clone(),
                city: self.city.clone(),
                country_code: self.country.clone(),
                postal_code: self.postcode.clone(),
            }),
        }
    }
}

/// Parameters for creating an invoice on the processor.
#[derive(Debug, Clone)]
pub struct InvoiceRequest {
    /// CoinPayments client id of this merchant account.
    pub client_id: String,
    /// Caller-supplied composite invoice id (`md5(host)|local_client_id`).
    pub invoice_id: String,
    /// Processor-specific numeric id of the fiat currency.
    pub currency_id: u32,
    /// Amount as an integer minor-unit string (precision 2: 10.00 → "1000").
    pub value: String,
    /// Human-readable decimal amount.
    pub display_value: Decimal,
    /// Per-invoice allocations; omitted from the wire when empty.
    pub allocations: Vec<InvoiceAllocation>,
    /// Optional buyer billing profile.
    pub buyer: Option<BuyerProfile>,
    /// Free-text note (order link, store name, order description).
    pub notes: Option<String>,
}

impl InvoiceRequest {
    /// Build the JSON body for this request.
    ///
    /// `with_client_id` is true on the unsigned simple-invoice path; the
    /// merchant path identifies the client through the signed headers
    /// instead.
    pub fn wire(&self, metadata: &InvoiceMetadata, with_client_id: bool) -> InvoiceBody {
        InvoiceBody {
            client_id: with_client_id.then(|| self.client_id.clone()),
            invoice_id: self.invoice_id.clone(),
            amount: AmountBody {
                currency_id: self.currency_id,
                display_value: self.display_value,
                value: self.value.clone(),
            },
            notes_to_recipient: self.notes.clone(),
            custom: (!self.allocations.is_empty()).then(|| CustomAmounts {
                amounts: self.allocations.clone(),
            }),
            metadata: metadata.clone(),
            buyer: self.buyer.as_ref().map(BuyerProfile::wire),
        }
    }
}

/// Wire body of an invoice creation request.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    pub invoice_id: String,
    pub amount: AmountBody,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes_to_recipient: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom: Option<CustomAmounts>,
    pub metadata: InvoiceMetadata,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub buyer: Option<BuyerBody>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AmountBody {
    pub currency_id: u32,
    pub display_value: Decimal,
    pub value: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CustomAmounts {
    pub amounts: Vec<InvoiceAllocation>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuyerBody {
    pub company_name: String,
    pub name: BuyerName,
    pub phone_number: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<BuyerAddress>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuyerName {
    pub first_name: String,
    pub last_name: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuyerAddress {
    #[serde(rename = "address1")]
    pub address_1: String,
    #[serde(rename = "address2")]
    pub address_2: String,
    pub province_or_state: String,
    pub city: String,
    pub country_code: String,
    pub postal_code: String,
}

/// A created invoice, as returned by both creation paths.
#[derive(Debug, Clone, Deserialize)]
pub struct Invoice {
    pub id: String,
}

/// Response of the merchant invoice path; the caller takes the first entry.
#[derive(Debug, Clone, Deserialize)]
pub struct MerchantInvoices {
    #[serde(default)]
    pub invoices: Vec<Invoice>,
}

/// Full invoice detail from `GET invoices/{id}`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceDetail {
    pub id: String,
    #[serde(default)]
    pub custom_data: Option<InvoiceCustomData>,
}

/// Custom fields come back stringified: `customData.amounts` is a
/// JSON-encoded string of the allocation list sent on creation.
#[derive(Debug, Clone, Deserialize)]
pub struct InvoiceCustomData {
    #[serde(default)]
    pub amounts: Option<String>,
}

impl InvoiceDetail {
    /// Decode the stored allocation list; absent or undecodable custom data
    /// yields an empty list.
    pub fn parsed_allocations(&self) -> Vec<InvoiceAllocation> {
        self.custom_data
            .as_ref()
            .and_then(|c| c.amounts.as_deref())
            .and_then(|raw| serde_json::from_str(raw).ok())
            .unwrap_or_default()
    }
}
