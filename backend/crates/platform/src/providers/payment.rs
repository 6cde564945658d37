//! Payment gateway
//!
//! Orders are created server-side; the client completes payment with the
//! gateway and posts back `(order_id, payment_id, signature)`. The signature
//! is HMAC-SHA256 over `order_id|payment_id` with the gateway key secret.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{ProviderError, ProviderResult};
use crate::crypto::{constant_time_eq, hmac_sha256_hex, random_bytes};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentOrder {
    pub order_id: String,
    /// Smallest currency unit (paise, cents)
    pub amount: i64,
    pub currency: String,
    pub receipt: String,
    pub created_at: DateTime<Utc>,
}

#[trait_variant::make(PaymentGateway: Send)]
pub trait LocalPaymentGateway {
    async fn create_order(
        &self,
        amount: i64,
        currency: &str,
        receipt: &str,
    ) -> ProviderResult<PaymentOrder>;

    /// `Ok(false)` for a well-formed but wrong signature
    async fn verify(&self, order_id: &str, payment_id: &str, signature: &str)
    -> ProviderResult<bool>;
}

/// Local gateway that signs like the real one but never charges anything
#[derive(Clone)]
pub struct StubPaymentGateway {
    key_secret: Vec<u8>,
}

impl StubPaymentGateway {
    pub fn new(key_secret: impl Into<Vec<u8>>) -> Self {
        Self {
            key_secret: key_secret.into(),
        }
    }

    /// The signature the gateway would hand back to the client
    pub fn sign(&self, order_id: &str, payment_id: &str) -> String {
        hmac_sha256_hex(&self.key_secret, format!("{order_id}|{payment_id}").as_bytes())
    }
}

impl PaymentGateway for StubPaymentGateway {
    async fn create_order(
        &self,
        amount: i64,
        currency: &str,
        receipt: &str,
    ) -> ProviderResult<PaymentOrder> {
        if amount <= 0 {
            return Err(ProviderError::Rejected {
                provider: "payment",
                message: format!("amount must be positive, got {amount}"),
            });
        }
        if currency.len() != 3 {
            return Err(ProviderError::Rejected {
                provider: "payment",
                message: format!("unsupported currency: {currency}"),
            });
        }

        Ok(PaymentOrder {
            order_id: format!("order_{}", hex::encode(random_bytes(8))),
            amount,
            currency: currency.to_ascii_uppercase(),
            receipt: receipt.to_string(),
            created_at: Utc::now(),
        })
    }

    async fn verify(
        &self,
        order_id: &str,
        payment_id: &str,
        signature: &str,
    ) -> ProviderResult<bool> {
        let expected = self.sign(order_id, payment_id);
        Ok(constant_time_eq(
            expected.as_bytes(),
            signature.to_ascii_lowercase().as_bytes(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::{PaymentGateway, ProviderError, StubPaymentGateway};

    #[tokio::test]
    async fn test_order_and_signature_verification() {
        let gateway = StubPaymentGateway::new("rzp_test_secret");
        let order = gateway.create_order(49_900, "inr", "enroll-42").await.unwrap();
        assert!(order.order_id.starts_with("order_"));
        assert_eq!(order.currency, "INR");

        let signature = gateway.sign(&order.order_id, "pay_123");
        assert!(gateway.verify(&order.order_id, "pay_123", &signature).await.unwrap());
        assert!(!gateway.verify(&order.order_id, "pay_124", &signature).await.unwrap());
        assert!(!gateway.verify(&order.order_id, "pay_123", "deadbeef").await.unwrap());
    }

    #[tokio::test]
    async fn test_rejects_non_positive_amount() {
        let gateway = StubPaymentGateway::new("secret");
        assert!(matches!(
            gateway.create_order(0, "INR", "r").await,
            Err(ProviderError::Rejected { .. })
        ));
    }
}
