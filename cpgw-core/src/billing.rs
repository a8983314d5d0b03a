//! Collaborator contracts consumed from the billing platform.
//!
//! These are the request-scoped values the billing side hands to the
//! orchestrator: who is paying, how they can be reached, and which local
//! invoices the payment covers.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use cpgw_sdk::objects::invoice::BuyerProfile;

/// Type of a contact phone-book entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContactNumberKind {
    Phone,
    Fax,
    Mobile,
}

/// A single contact phone-book entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactNumber {
    pub kind: ContactNumberKind,
    pub number: String,
}

/// Billing context for one payment attempt.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BillingContext {
    /// The local billing platform's client id (not the processor's).
    pub client_id: String,
    pub first_name: String,
    pub last_name: String,
    pub company: String,
    pub email: String,
    pub address_1: String,
    pub address_2: String,
    pub city: String,
    pub state: String,
    /// 2-letter uppercase ISO country code.
    pub country: String,
    pub zip: String,
    #[serde(default)]
    pub numbers: Vec<ContactNumber>,
}

impl BillingContext {
    /// The buyer profile forwarded to the processor, with the phone number
    /// resolved from the contact's phone-book entries.
    pub fn buyer_profile(&self) -> BuyerProfile {
        BuyerProfile {
            company: self.company.clone(),
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            phone: primary_phone(&self.numbers),
            email: self.email.clone(),
            address_1: self.address_1.clone(),
            address_2: self.address_2.clone(),
            city: self.city.clone(),
            state: self.state.clone(),
            country: self.country.clone(),
            postcode: self.zip.clone(),
        }
    }
}

/// Caller options for one payment attempt.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PaymentOptions {
    /// Free-text description of the charge.
    #[serde(default)]
    pub description: String,
    /// Where the processor sends the buyer back after checkout.
    pub return_url: String,
}

/// First entry of type `phone`, normalized to ASCII digits only. Empty when
/// the contact has no phone number.
pub fn primary_phone(numbers: &[ContactNumber]) -> String {
    numbers
        .iter()
        .find(|n| n.kind == ContactNumberKind::Phone)
        .map(|n| n.number.chars().filter(char::is_ascii_digit).collect())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primary_phone_takes_first_phone_entry_digits_only() {
        let numbers = vec![
            ContactNumber {
                kind: ContactNumberKind::Fax,
                number: "+1 (555) 000-0000".into(),
            },
            ContactNumber {
                kind: ContactNumberKind::Phone,
                number: "+1 (555) 123-4567".into(),
            },
            ContactNumber {
                kind: ContactNumberKind::Phone,
                number: "999".into(),
            },
        ];
        assert_eq!(primary_phone(&numbers), "15551234567");
    }

    #[test]
    fn primary_phone_is_empty_without_phone_entries() {
        let numbers = vec![ContactNumber {
            kind: ContactNumberKind::Mobile,
            number: "123".into(),
        }];
        assert_eq!(primary_phone(&numbers), "");
        assert_eq!(primary_phone(&[]), "");
    }
}
