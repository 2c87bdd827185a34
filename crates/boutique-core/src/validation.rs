//! # Validation Module
//!
//! Input checks for bag operations and checkout.
//!
//! ## Where Validation Happens
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Bag operations (add/remove)                                           │
//! │  ├── product id present          ← validate_product_id                 │
//! │  └── quantity > 0                ← validate_quantity                   │
//! │      Failure: reported to the event sink, operation is a no-op         │
//! │                                                                         │
//! │  Checkout command                                                      │
//! │  └── email well-formed           ← validate_email                      │
//! │      Failure: returned to the caller before details are patched        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::ValidationError;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Maximum length accepted for an email address.
const MAX_EMAIL_LEN: usize = 254;

/// Validates that a product reference carries an id.
///
/// ```rust
/// use boutique_core::validation::validate_product_id;
///
/// assert!(validate_product_id("p1").is_ok());
/// assert!(validate_product_id("  ").is_err());
/// ```
pub fn validate_product_id(product_id: &str) -> ValidationResult<()> {
    if product_id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "product.id".to_string(),
        });
    }
    Ok(())
}

/// Validates a bag quantity (must be at least 1).
pub fn validate_quantity(quantity: u32) -> ValidationResult<()> {
    if quantity == 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }
    Ok(())
}

/// Validates a recipient email address.
///
/// ## Rules
/// - Not empty, at most 254 characters
/// - Exactly one `@` with a non-empty local part
/// - Domain contains a dot that is neither first nor last
/// - No whitespace
///
/// ```rust
/// use boutique_core::validation::validate_email;
///
/// assert!(validate_email("ada@example.com").is_ok());
/// assert!(validate_email("ada@localhost").is_err());
/// ```
pub fn validate_email(email: &str) -> ValidationResult<()> {
    let email = email.trim();
    let invalid = |reason: &str| ValidationError::InvalidFormat {
        field: "email".to_string(),
        reason: reason.to_string(),
    };

    if email.is_empty() {
        return Err(ValidationError::Required {
            field: "email".to_string(),
        });
    }

    if email.len() > MAX_EMAIL_LEN {
        return Err(ValidationError::TooLong {
            field: "email".to_string(),
            max: MAX_EMAIL_LEN,
        });
    }

    if email.chars().any(char::is_whitespace) {
        return Err(invalid("must not contain spaces"));
    }

    let (local, domain) = email
        .split_once('@')
        .ok_or_else(|| invalid("missing '@'"))?;

    if local.is_empty() || domain.contains('@') {
        return Err(invalid("expected exactly one '@' after a name"));
    }

    if domain.starts_with('.') || domain.ends_with('.') || !domain.contains('.') {
        return Err(invalid("domain must contain a dot"));
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
