//! # Error Types
//!
//! Domain-specific error types for boutique-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  boutique-core errors (this file)                                      │
//! │  ├── CoreError        - General domain errors                          │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  boutique-db errors          └── DbError                               │
//! │  boutique-catalog errors     └── CatalogError                          │
//! │  storefront app errors       └── AppError (with ErrorCode)             │
//! │                                                                         │
//! │  The state container never raises these: it reports them to its        │
//! │  event sink and leaves state untouched.                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core domain errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Product cannot be found in the cached catalog.
    ///
    /// ## When This Occurs
    /// - A stale link points at a product removed from the store
    /// - The catalog has not been refreshed yet
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// Accumulated quantity no longer fits the quantity type.
    #[error("Quantity {current} + {requested} exceeds maximum allowed ({max})")]
    QuantityTooLarge {
        current: u32,
        requested: u32,
        max: u32,
    },

    /// A bag line total or subtotal does not fit in an `i64` of cents.
    #[error("Amount exceeds the largest representable total")]
    AmountOverflow,

    /// Money amount could not be parsed or is out of range.
    #[error("Invalid amount '{value}': {reason}")]
    InvalidAmount { value: String, reason: String },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These occur when caller input doesn't meet requirements, e.g. a bag
/// operation called with a product that has no id.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., malformed email).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::QuantityTooLarge {
            current: 4_294_967_290,
            requested: 10,
            max: u32::MAX,
        };
        assert_eq!(
            err.to_string(),
            "Quantity 4294967290 + 10 exceeds maximum allowed (4294967295)"
        );

        let err = CoreError::ProductNotFound("p9".to_string());
        assert_eq!(err.to_string(), "Product not found: p9");
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "product.id".to_string(),
        };
        assert_eq!(err.to_string(), "product.id is required");

        let err = ValidationError::MustBePositive {
            field: "quantity".to_string(),
        };
        assert_eq!(err.to_string(), "quantity must be positive");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "product.id".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
