//! Order processing domain module.
//!
//! This crate holds the `Order` entity, the two gateway contracts the workflow
//! consumes (persistence and notification), and `OrderWorkflow` itself. It does
//! no IO of its own; adapters live in `orderflow-infra`.

pub mod gateway;
pub mod order;
pub mod workflow;

pub use gateway::{NotificationError, NotificationGateway, PersistenceError, PersistenceGateway};
pub use order::{Money, Order, OrderId};
pub use workflow::{
    CONFIRMATION_THRESHOLD, NotificationFailurePolicy, OrderWorkflow, OrderWorkflowBuilder,
    WorkflowError, WorkflowResult,
};
