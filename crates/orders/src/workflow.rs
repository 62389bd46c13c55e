//! Order processing workflow (application-level orchestration).
//!
//! One call to [`OrderWorkflow::process`] walks a single order through:
//!
//! ```text
//! Order
//!   ↓
//! 1. Validate (total must be > 0)          → Ok(false) on rejection
//!   ↓
//! 2. Ensure persistence is connected       → Err(Connection) on failure
//!   ↓
//! 3. Save                                  → Ok(false) on failure
//!   ↓
//! 4. Confirm by email when total > 100     → failure swallowed (or Ok(false) for legacy)
//!   ↓
//! 5. Mark processed                        → Ok(true)
//! ```
//!
//! Infrastructure failures that the caller must deal with (a missing order, a
//! connection that cannot be established) come back as `Err`. Business outcomes
//! and write failures come back as `Ok(bool)`. The two paths must stay separate.
//!
//! Nothing is retained between calls.

use rust_decimal::Decimal;
use thiserror::Error;
use tracing::{debug, info, info_span, warn};
use uuid::Uuid;

use crate::gateway::{NotificationGateway, PersistenceError, PersistenceGateway};
use crate::order::{Money, Order};

/// Orders with a total strictly above this get a confirmation email.
pub const CONFIRMATION_THRESHOLD: Money = Money::new(Decimal::ONE_HUNDRED);

/// Errors that escape the workflow instead of being folded into the boolean result.
#[derive(Debug, Error)]
pub enum WorkflowError {
    /// A required argument was absent. Always a caller bug.
    #[error("invalid argument: `{param}` must be provided")]
    InvalidArgument { param: &'static str },

    /// The persistence gateway could not be connected.
    #[error("persistence connection failed: {0}")]
    Connection(#[source] PersistenceError),
}

impl WorkflowError {
    /// Name of the offending parameter for `InvalidArgument`.
    pub fn param_name(&self) -> Option<&'static str> {
        match self {
            WorkflowError::InvalidArgument { param } => Some(*param),
            WorkflowError::Connection(_) => None,
        }
    }
}

pub type WorkflowResult<T> = Result<T, WorkflowError>;

/// What a failed confirmation email does to the overall result.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub enum NotificationFailurePolicy {
    /// Log and carry on: the order is still marked processed and `true` is returned.
    #[default]
    Isolate,
    /// Legacy behaviour: report `false` and leave the order unprocessed. The save
    /// has already happened and is not undone.
    FailOrder,
}

/// Validates, persists, confirms and marks orders processed.
#[derive(Debug, Clone)]
pub struct OrderWorkflow<P, N> {
    persistence: P,
    notifier: N,
    notification_policy: NotificationFailurePolicy,
}

impl<P, N> OrderWorkflow<P, N> {
    pub fn new(persistence: P, notifier: N) -> Self {
        Self {
            persistence,
            notifier,
            notification_policy: NotificationFailurePolicy::Isolate,
        }
    }

    /// Workflow that lets a failed confirmation email fail the whole order.
    pub fn legacy(persistence: P, notifier: N) -> Self {
        Self::new(persistence, notifier).with_notification_policy(NotificationFailurePolicy::FailOrder)
    }

    pub fn builder() -> OrderWorkflowBuilder<P, N> {
        OrderWorkflowBuilder::new()
    }

    pub fn with_notification_policy(mut self, policy: NotificationFailurePolicy) -> Self {
        self.notification_policy = policy;
        self
    }

    pub fn notification_policy(&self) -> NotificationFailurePolicy {
        self.notification_policy
    }
}

impl<P, N> OrderWorkflow<P, N>
where
    P: PersistenceGateway,
    N: NotificationGateway,
{
    /// Process an order that may be absent.
    ///
    /// `None` fails with [`WorkflowError::InvalidArgument`] naming `order`,
    /// regardless of gateway state and before any gateway is touched.
    pub fn process_optional(&self, order: Option<&mut Order>) -> WorkflowResult<bool> {
        let order = order.ok_or(WorkflowError::InvalidArgument { param: "order" })?;
        self.process(order)
    }

    /// Run one order through the workflow.
    ///
    /// ## Return Value
    ///
    /// - `Ok(true)`: saved (and confirmed if required); `order.is_processed()` is now true
    /// - `Ok(false)`: rejected by validation, or the save failed (or, under
    ///   [`NotificationFailurePolicy::FailOrder`], the confirmation failed);
    ///   the processed flag is untouched
    /// - `Err(Connection)`: `connect` failed; nothing was saved
    pub fn process(&self, order: &mut Order) -> WorkflowResult<bool> {
        let run_id = Uuid::now_v7();
        let span = info_span!(
            "order_workflow.process",
            order_id = %order.id(),
            run_id = %run_id
        );
        let _entered = span.enter();

        if let Err(err) = order.validate_for_processing() {
            debug!(total = %order.total_amount(), error = %err, "order rejected");
            return Ok(false);
        }

        self.ensure_connected()?;

        if let Err(err) = self.persistence.save(order) {
            warn!(error = %err, "save failed; order left unprocessed");
            return Ok(false);
        }
        debug!("order saved");

        if requires_confirmation(order) && !self.send_confirmation(order) {
            return Ok(false);
        }

        order.mark_processed();
        info!(total = %order.total_amount(), "order processed");
        Ok(true)
    }

    fn ensure_connected(&self) -> WorkflowResult<()> {
        if !self.persistence.is_connected() {
            debug!("persistence not connected; connecting");
            self.persistence
                .connect()
                .map_err(WorkflowError::Connection)?;
        }
        Ok(())
    }

    /// Returns whether processing may continue after the confirmation attempt.
    fn send_confirmation(&self, order: &Order) -> bool {
        let result = self
            .notifier
            .send_order_confirmation(order.customer_email(), order.id());

        match (result, self.notification_policy) {
            (Ok(()), _) => {
                debug!("confirmation sent");
                true
            }
            (Err(err), NotificationFailurePolicy::Isolate) => {
                warn!(error = %err, "confirmation failed; order still processed");
                true
            }
            (Err(err), NotificationFailurePolicy::FailOrder) => {
                warn!(error = %err, "confirmation failed; order left unprocessed");
                false
            }
        }
    }
}

fn requires_confirmation(order: &Order) -> bool {
    order.total_amount() > CONFIRMATION_THRESHOLD
}

/// Builder that checks both collaborators were supplied.
#[derive(Debug)]
pub struct OrderWorkflowBuilder<P, N> {
    persistence: Option<P>,
    notifier: Option<N>,
    notification_policy: NotificationFailurePolicy,
}

impl<P, N> Default for OrderWorkflowBuilder<P, N> {
    fn default() -> Self {
        Self {
            persistence: None,
            notifier: None,
            notification_policy: NotificationFailurePolicy::default(),
        }
    }
}

impl<P, N> OrderWorkflowBuilder<P, N> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn persistence(mut self, persistence: P) -> Self {
        self.persistence = Some(persistence);
        self
    }

    pub fn notifier(mut self, notifier: N) -> Self {
        self.notifier = Some(notifier);
        self
    }

    pub fn notification_policy(mut self, policy: NotificationFailurePolicy) -> Self {
        self.notification_policy = policy;
        self
    }

    pub fn build(self) -> WorkflowResult<OrderWorkflow<P, N>> {
        let persistence = self
            .persistence
            .ok_or(WorkflowError::InvalidArgument { param: "persistence" })?;
        let notifier = self
            .notifier
            .ok_or(WorkflowError::InvalidArgument { param: "notifier" })?;

        Ok(OrderWorkflow::new(persistence, notifier).with_notification_policy(self.notification_policy))
    }
}
