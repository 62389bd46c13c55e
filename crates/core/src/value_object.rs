//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Value objects have no identity; two values with the same attributes are equal.
/// An order's total is a value object, the order itself is an entity.
///
/// To "modify" a value object, build a new one. Implementors should be cheap to
/// copy and comparable by value:
///
/// ```ignore
/// #[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// struct Money(Decimal);
///
/// impl ValueObject for Money {}
///
/// assert_eq!(Money(Decimal::new(10000, 2)), Money(Decimal::from(100)));
/// ```
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
