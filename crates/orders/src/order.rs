use core::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use orderflow_core::{DomainError, DomainResult, Entity, ValueObject};

/// Order identifier, assigned by whoever constructs the order.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(i32);

impl OrderId {
    pub const fn new(raw: i32) -> Self {
        Self(raw)
    }
}

impl core::fmt::Display for OrderId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

impl From<i32> for OrderId {
    fn from(value: i32) -> Self {
        Self(value)
    }
}

impl FromStr for OrderId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s
            .trim()
            .parse::<i32>()
            .map_err(|e| DomainError::invalid_id(format!("OrderId: {e}")))?;
        Ok(Self(raw))
    }
}

/// Monetary amount at currency precision.
///
/// Comparison is exact decimal comparison, so `100.00` equals `100` and is not
/// greater than it.
#[derive(
    Debug, Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Money(Decimal);

impl Money {
    pub const ZERO: Money = Money(Decimal::ZERO);

    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Build an amount from minor units, e.g. `from_minor(29_999, 2)` is `299.99`.
    ///
    /// Scales above 28 cannot be represented and are rejected.
    pub fn from_minor(minor: i64, scale: u32) -> DomainResult<Self> {
        Decimal::try_new(minor, scale)
            .map(Self)
            .map_err(|e| DomainError::validation(format!("amount {minor}e-{scale}: {e}")))
    }

    pub fn amount(&self) -> Decimal {
        self.0
    }

    /// Strictly greater than zero.
    pub fn is_positive(&self) -> bool {
        self.0 > Decimal::ZERO
    }
}

impl ValueObject for Money {}

impl From<Decimal> for Money {
    fn from(value: Decimal) -> Self {
        Self(value)
    }
}

impl From<i32> for Money {
    fn from(value: i32) -> Self {
        Self(Decimal::from(value))
    }
}

impl From<i64> for Money {
    fn from(value: i64) -> Self {
        Self(Decimal::from(value))
    }
}

impl core::fmt::Display for Money {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// A customer order.
///
/// Orders are built by the caller with `is_processed == false`; only
/// `OrderWorkflow` flips the flag, and only after a successful save.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    id: OrderId,
    customer_email: String,
    total_amount: Money,
    #[serde(default)]
    is_processed: bool,
}

impl Order {
    pub fn new(id: OrderId, customer_email: impl Into<String>, total_amount: impl Into<Money>) -> Self {
        Self {
            id,
            customer_email: customer_email.into(),
            total_amount: total_amount.into(),
            is_processed: false,
        }
    }

    pub fn id(&self) -> OrderId {
        self.id
    }

    pub fn customer_email(&self) -> &str {
        &self.customer_email
    }

    pub fn total_amount(&self) -> Money {
        self.total_amount
    }

    pub fn is_processed(&self) -> bool {
        self.is_processed
    }

    /// Check the single business rule gating processing: a strictly positive total.
    pub fn validate_for_processing(&self) -> DomainResult<()> {
        if !self.total_amount.is_positive() {
            return Err(DomainError::validation("total amount must be positive"));
        }
        Ok(())
    }

    pub(crate) fn mark_processed(&mut self) {
        self.is_processed = true;
    }
}

impl Entity for Order {
    type Id = OrderId;

    fn id(&self) -> Self::Id {
        self.id
    }
}
