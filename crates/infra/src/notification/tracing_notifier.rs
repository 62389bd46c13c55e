use tracing::info;

use orderflow_orders::{NotificationError, NotificationGateway, OrderId};

/// Development notifier.
///
/// Writes each confirmation to the log instead of sending it. Blank addresses
/// are rejected the way a real mail provider would reject them.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl TracingNotifier {
    pub const fn new() -> Self {
        Self
    }
}

impl NotificationGateway for TracingNotifier {
    fn send_order_confirmation(
        &self,
        customer_email: &str,
        order_id: OrderId,
    ) -> Result<(), NotificationError> {
        if customer_email.trim().is_empty() {
            return Err(NotificationError::Rejected {
                to: customer_email.to_string(),
                reason: "empty recipient address".to_string(),
            });
        }

        info!(to = %customer_email, order_id = %order_id, "order confirmation");
        Ok(())
    }
}
