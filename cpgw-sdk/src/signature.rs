//! Signature algorithm for the CoinPayments v1 API.
//!
//! Outbound merchant requests and inbound webhook notifications are both
//! authenticated with base64-encoded HMAC-SHA256 over a fixed byte layout.
//!
//! * **Request signing** (merchant API):
//!   `HMAC-SHA256(BOM + method + url + client_id + timestamp + body, secret)`
//!   where `BOM` is the three bytes `EF BB BF`.  The processor prepends the
//!   UTF-8 byte-order mark unconditionally; the exact byte sequence is part
//!   of the wire contract.
//!
//! * **Webhook verification**:
//!   `HMAC-SHA256(notification_url + raw_body, secret)` where `raw_body` is
//!   the unparsed request body exactly as received.

/// Header carrying the client id on signed requests.
pub const CLIENT_HEADER: &str = "X-CoinPayments-Client";

/// Header carrying the RFC 3339 timestamp on signed requests.
pub const TIMESTAMP_HEADER: &str = "X-CoinPayments-Timestamp";

/// Header carrying the base64 HMAC signature, on signed requests and on
/// inbound webhook notifications.
pub const SIGNATURE_HEADER: &str = "X-CoinPayments-Signature";

/// UTF-8 byte-order mark prepended to every request signature message.
pub const UTF8_BOM: [u8; 3] = [0xEF, 0xBB, 0xBF];

/// Compute `base64(HMAC-SHA256(secret, message))`.
///
/// Pure function; the same inputs always yield the same string.
pub fn encode_signature(message: &[u8], secret: &str) -> String {
    let key = ring::hmac::Key::new(ring::hmac::HMAC_SHA256, secret.as_bytes());
    let tag = ring::hmac::sign(&key, message);
    fast32::base64::RFC4648.encode(tag.as_ref())
}

/// Assemble the signature message for an outbound API request.
///
/// Field order is interop-critical: BOM, method, url, client id, timestamp,
/// body.  `body_json` is the empty string for bodyless requests.
pub fn request_message(
    method: &str,
    url: &str,
    client_id: &str,
    timestamp: &str,
    body_json: &str,
) -> Vec<u8> {
    let mut message = Vec::with_capacity(
        UTF8_BOM.len()
            + method.len()
            + url.len()
            + client_id.len()
            + timestamp.len()
            + body_json.len(),
    );
    message.extend_from_slice(&UTF8_BOM);
    message.extend_from_slice(method.as_bytes());
    message.extend_from_slice(url.as_bytes());
    message.extend_from_slice(client_id.as_bytes());
    message.extend_from_slice(timestamp.as_bytes());
    message.extend_from_slice(body_json.as_bytes());
    message
}

/// Assemble the signature message for an inbound webhook notification:
/// the notification URL followed immediately by the raw body bytes.
pub fn webhook_message(notification_url: &str, raw_body: &[u8]) -> Vec<u8> {
    let mut message = Vec::with_capacity(notification_url.len() + raw_body.len());
    message.extend_from_slice(notification_url.as_bytes());
    message.extend_from_slice(raw_body);
    message
}

/// Verify a base64 candidate signature against the expected message.
///
/// The comparison goes through [`ring::hmac::verify`], which is
/// constant-time.  A candidate that is not valid base64 verifies false.
pub fn verify_signature(candidate: &str, message: &[u8], secret: &str) -> bool {
    let Ok(candidate_bytes) = fast32::base64::RFC4648.decode_str(candidate) else {
        return false;
    };
    let key = ring::hmac::Key::new(ring::hmac::HMAC_SHA256, secret.as_bytes());
    ring::hmac::verify(&key, message, &candidate_bytes).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-client-secret";

    fn sample_message() -> Vec<u8> {
        request_message(
            "POST",
            "https://api.coinpayments.net/api/v1/merchant/invoices",
            "client-123",
            "2024-05-01T12:00:00Z",
            r#"{"invoiceId":"abc|42"}"#,
        )
    }

    #[test]
    fn request_message_starts_with_bom() {
        let message = sample_message();
        assert_eq!(&message[..3], &[0xEF, 0xBB, 0xBF]);
    }

    #[test]
    fn request_message_field_order() {
        let message = request_message("POST", "URL", "CID", "TS", "BODY");
        let mut expected = vec![0xEF, 0xBB, 0xBF];
        expected.extend_from_slice(b"POSTURLCIDTSBODY");
        assert_eq!(message, expected);
    }

    #[test]
    fn empty_body_contributes_nothing() {
        let with_empty = request_message("GET", "URL", "CID", "TS", "");
        let mut expected = vec![0xEF, 0xBB, 0xBF];
        expected.extend_from_slice(b"GETURLCIDTS");
        assert_eq!(with_empty, expected);
    }

    #[test]
    fn sign_verify_round_trip() {
        let message = sample_message();
        let signature = encode_signature(&message, SECRET);
        assert!(verify_signature(&signature, &message, SECRET));
    }

    #[test]
    fn signature_is_deterministic() {
        let message = sample_message();
        assert_eq!(
            encode_signature(&message, SECRET),
            encode_signature(&message, SECRET)
        );
    }

    #[test]
    fn any_field_mutation_fails_verification() {
        let signature = encode_signature(&sample_message(), SECRET);
        let mutations = [
            ("GET", "https://api.coinpayments.net/api/v1/merchant/invoices", "client-123", "2024-05-01T12:00:00Z", r#"{"invoiceId":"abc|42"}"#),
            ("POST", "https://api.coinpayments.net/api/v1/merchant/invoicex", "client-123", "2024-05-01T12:00:00Z", r#"{"invoiceId":"abc|42"}"#),
            ("POST", "https://api.coinpayments.net/api/v1/merchant/invoices", "client-124", "2024-05-01T12:00:00Z", r#"{"invoiceId":"abc|42"}"#),
            ("POST", "https://api.coinpayments.net/api/v1/merchant/invoices", "client-123", "2024-05-01T12:00:01Z", r#"{"invoiceId":"abc|42"}"#),
            ("POST", "https://api.coinpayments.net/api/v1/merchant/invoices", "client-123", "2024-05-01T12:00:00Z", r#"{"invoiceId":"abc|43"}"#),
        ];
        for (method, url, client_id, timestamp, body) in mutations {
            let mutated = request_message(method, url, client_id, timestamp, body);
            assert!(
                !verify_signature(&signature, &mutated, SECRET),
                "mutation of ({method}, {url}, {client_id}, {timestamp}) should not verify"
            );
        }
    }

    #[test]
    fn wrong_secret_fails_verification() {
        let message = sample_message();
        let signature = encode_signature(&message, SECRET);
        assert!(!verify_signature(&signature, &message, "other-secret"));
    }

    #[test]
    fn malformed_base64_candidate_fails_verification() {
        let message = sample_message();
        assert!(!verify_signature("not base64 at all!!!", &message, SECRET));
    }

    #[test]
    fn webhook_message_is_url_then_body() {
        let message = webhook_message("https://host/cb/?clientId=a&event=Paid", b"{\"x\":1}");
        assert_eq!(
            message,
            b"https://host/cb/?clientId=a&event=Paid{\"x\":1}".to_vec()
        );
    }

    #[test]
    fn webhook_sign_verify_round_trip() {
        let body = br#"{"invoice":{"id":"x","status":"Paid"}}"#;
        let message = webhook_message("https://host/cb/?clientId=a&event=Paid", body);
        let signature = encode_signature(&message, SECRET);
        assert!(verify_signature(&signature, &message, SECRET));

        let tampered = webhook_message("https://host/cb/?clientId=a&event=Cancelled", body);
        assert!(!verify_signature(&signature, &tampered, SECRET));
    }
}
