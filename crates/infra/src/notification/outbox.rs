use std::sync::{Mutex, MutexGuard};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use orderflow_orders::{NotificationError, NotificationGateway, OrderId};

/// A confirmation accepted by the outbox.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentConfirmation {
    pub to: String,
    pub order_id: OrderId,
    pub sent_at: DateTime<Utc>,
}

/// Notifier that records confirmations instead of delivering them.
///
/// Useful in tests and as a staging area for a relay that delivers later.
/// `set_reject(true)` makes every send fail with `NotificationError::Rejected`.
#[derive(Debug, Default)]
pub struct OutboxNotifier {
    sent: Mutex<Vec<SentConfirmation>>,
    reject: AtomicBool,
    attempts: AtomicUsize,
}

impl OutboxNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_reject(&self, reject: bool) {
        self.reject.store(reject, Ordering::SeqCst);
    }

    /// Sends attempted, accepted or not.
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    /// Snapshot of accepted confirmations, oldest first.
    pub fn sent(&self) -> Result<Vec<SentConfirmation>, NotificationError> {
        let sent = self.records()?;
        Ok(sent.clone())
    }

    /// Take every accepted confirmation, leaving the outbox empty.
    pub fn drain(&self) -> Result<Vec<SentConfirmation>, NotificationError> {
        let mut sent = self.records()?;
        Ok(std::mem::take(&mut *sent))
    }

    fn records(&self) -> Result<MutexGuard<'_, Vec<SentConfirmation>>, NotificationError> {
        self.sent
            .lock()
            .map_err(|_| NotificationError::Other(anyhow::anyhow!("outbox lock poisoned")))
    }
}

impl NotificationGateway for OutboxNotifier {
    fn send_order_confirmation(
        &self,
        customer_email: &str,
        order_id: OrderId,
    ) -> Result<(), NotificationError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);

        if self.reject.load(Ordering::SeqCst) {
            return Err(NotificationError::Rejected {
                to: customer_email.to_string(),
                reason: "outbox is rejecting messages".to_string(),
            });
        }

        let mut sent = self.records()?;
        sent.push(SentConfirmation {
            to: customer_email.to_string(),
            order_id,
            sent_at: Utc::now(),
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_confirmations_in_order() {
        let outbox = OutboxNotifier::new();
        let before = Utc::now();

        outbox.send_order_confirmation("a@b.c", OrderId::new(1)).unwrap();
        outbox.send_order_confirmation("d@e.f", OrderId::new(2)).unwrap();

        let sent = outbox.sent().unwrap();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].to, "a@b.c");
        assert_eq!(sent[1].order_id, OrderId::new(2));
        assert!(sent[0].sent_at >= before);
        assert!(sent[0].sent_at <= sent[1].sent_at);
    }

    #[test]
    fn rejecting_outbox_counts_the_attempt_but_records_nothing() {
        let outbox = OutboxNotifier::new();
        outbox.set_reject(true);

        let err = outbox
            .send_order_confirmation("bad@email.com", OrderId::new(33))
            .unwrap_err();

        match err {
            NotificationError::Rejected { to, .. } => assert_eq!(to, "bad@email.com"),
            other => panic!("Expected Rejected, got {other:?}"),
        }
        assert_eq!(outbox.attempts(), 1);
        assert!(outbox.sent().unwrap().is_empty());
    }

    #[test]
    fn poisoned_outbox_reports_an_error_instead_of_looking_empty() {
        let outbox = OutboxNotifier::new();
        outbox.send_order_confirmation("a@b.c", OrderId::new(1)).unwrap();

        let _ = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _records = outbox.sent.lock().unwrap();
            panic!("relay died holding the lock");
        }));

        let err = outbox.sent().unwrap_err();
        assert!(err.to_string().contains("poisoned"));
        assert!(outbox.drain().is_err());
        assert!(outbox
            .send_order_confirmation("d@e.f", OrderId::new(2))
            .is_err());
    }

    #[test]
    fn drain_empties_the_outbox() {
        let outbox = OutboxNotifier::new();
        outbox.send_order_confirmation("a@b.c", OrderId::new(1)).unwrap();

        assert_eq!(outbox.drain().unwrap().len(), 1);
        assert!(outbox.sent().unwrap().is_empty());
    }
}
