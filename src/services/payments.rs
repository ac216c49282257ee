//! Payment processor seam
//!
//! External card processing is not wired up; this processor approves every
//! charge and refund so the settlement flow can be exercised end to end.
//! Swapping in a real gateway only touches this type.

#[derive(Clone, Default)]
pub struct PaymentProcessor;

impl PaymentProcessor {
    pub fn new() -> Self {
        Self
    }

    /// Charge the buyer. Returns Ok(false) for a decline, Err for
    /// infrastructure failures; this stub always approves.
    pub async fn charge_usd_cents(
        &self,
        order_reference: &str,
        amount_cents: i64,
    ) -> Result<bool, Box<dyn std::error::Error + Send + Sync>> {
        tracing::info!(
            "Charging {} cents for order {} (stub processor, auto-approved)",
            amount_cents,
            order_reference
        );
        Ok(true)
    }

    pub async fn refund_usd_cents(
        &self,
        order_reference: &str,
        amount_cents: i64,
    ) -> Result<bool, Box<dyn std::error::Error + Send + Sync>> {
        tracing::info!(
            "Refunding {} cents for order {} (stub processor, auto-approved)",
            amount_cents,
            order_reference
        );
        Ok(true)
    }
}
