//! Collaborator contracts consumed by `OrderWorkflow`.
//!
//! Both gateways are synchronous and take `&self`; implementations that keep
//! state use interior mutability. Blanket impls for `Arc<T>` and `&T` let one
//! adapter instance be shared between a workflow and whoever else needs it.

use std::sync::Arc;

use thiserror::Error;

use crate::order::{Order, OrderId};

/// Persistence gateway failure.
#[derive(Debug, Error)]
pub enum PersistenceError {
    /// Establishing the connection failed.
    #[error("connection failed: {0}")]
    Connection(String),

    /// Writing the order failed.
    #[error("save failed: {0}")]
    Save(String),

    #[error("order {0} not found")]
    NotFound(OrderId),

    /// A stored row could not be decoded back into an order.
    #[error("corrupt order record: {0}")]
    Corrupt(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Notification gateway failure.
#[derive(Debug, Error)]
pub enum NotificationError {
    #[error("confirmation to {to} rejected: {reason}")]
    Rejected { to: String, reason: String },

    #[error("notification timed out: {0}")]
    Timeout(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Durable storage for orders.
///
/// Connection management is exposed so the workflow can connect lazily; how the
/// connection is pooled, retried or timed out is the implementation's business.
pub trait PersistenceGateway: Send + Sync {
    fn is_connected(&self) -> bool;

    /// Establish the connection. Errors here are infrastructure failures and are
    /// escalated by the workflow, not absorbed.
    fn connect(&self) -> Result<(), PersistenceError>;

    /// Persist the order. The workflow reports a failure here as an unprocessed order.
    fn save(&self, order: &Order) -> Result<(), PersistenceError>;

    /// Load an order by id. Not used by the workflow itself.
    fn get_order(&self, id: OrderId) -> Result<Order, PersistenceError>;
}

/// Outbound confirmation messages.
pub trait NotificationGateway: Send + Sync {
    fn send_order_confirmation(
        &self,
        customer_email: &str,
        order_id: OrderId,
    ) -> Result<(), NotificationError>;
}

impl<P> PersistenceGateway for Arc<P>
where
    P: PersistenceGateway + ?Sized,
{
    fn is_connected(&self) -> bool {
        (**self).is_connected()
    }

    fn connect(&self) -> Result<(), PersistenceError> {
        (**self).connect()
    }

    fn save(&self, order: &Order) -> Result<(), PersistenceError> {
        (**self).save(order)
    }

    fn get_order(&self, id: OrderId) -> Result<Order, PersistenceError> {
        (**self).get_order(id)
    }
}

impl<P> PersistenceGateway for &P
where
    P: PersistenceGateway + ?Sized,
{
    fn is_connected(&self) -> bool {
        (**self).is_connected()
    }

    fn connect(&self) -> Result<(), PersistenceError> {
        (**self).connect()
    }

    fn save(&self, order: &Order) -> Result<(), PersistenceError> {
        (**self).save(order)
    }

    fn get_order(&self, id: OrderId) -> Result<Order, PersistenceError> {
        (**self).get_order(id)
    }
}

impl<N> NotificationGateway for Arc<N>
where
    N: NotificationGateway + ?Sized,
{
    fn send_order_confirmation(
        &self,
        customer_email: &str,
        order_id: OrderId,
    ) -> Result<(), NotificationError> {
        (**self).send_order_confirmation(customer_email, order_id)
    }
}

impl<N> NotificationGateway for &N
where
    N: NotificationGateway + ?Sized,
{
    fn send_order_confirmation(
        &self,
        customer_email: &str,
        order_id: OrderId,
    ) -> Result<(), NotificationError> {
        (**self).send_order_confirmation(customer_email, order_id)
    }
}
