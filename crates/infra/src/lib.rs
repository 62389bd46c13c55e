//! Infrastructure layer: gateway adapters for the order workflow.

pub mod notification;
pub mod persistence;


pub use notification::{OutboxNotifier, SentConfirmation, TracingNotifier};
pub use persistence::InMemoryOrderStore;
