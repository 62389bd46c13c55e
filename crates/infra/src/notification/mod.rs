//! `NotificationGateway` adapters.
//!
//! Real transports (SMTP, queues) plug in behind the same trait; these two cover
//! tests and local development.

pub mod outbox;
pub mod tracing_notifier;

pub use outbox::{OutboxNotifier, SentConfirmation};
pub use tracing_notifier::TracingNotifier;
