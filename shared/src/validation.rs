//! Validation utilities for the Inventory Management Platform

// ============================================================================
// Catalog Validations
// ============================================================================

/// Validate SKU format (3-32 chars, uppercase alphanumeric plus `-` and `_`)
pub fn validate_sku(sku: &str) -> Result<(), &'static str> {
    if sku.len() < 3 {
        return Err("SKU must be at least 3 characters");
    }
    if sku.len() > 32 {
        return Err("SKU must be at most 32 characters");
    }
    if !sku
        .chars()
        .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '-' || c == '_')
    {
        return Err("SKU must contain only uppercase letters, digits, '-' or '_'");
    }
    Ok(())
}

/// Validate a display name is non-empty and within bounds
pub fn validate_name(name: &str) -> Result<(), &'static str> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err("Name must not be empty");
    }
    if trimmed.len() > 128 {
        return Err("Name must be at most 128 characters");
    }
    Ok(())
}

// ============================================================================
// Ledger Validations
// ============================================================================

/// Validate a movement quantity is strictly positive
pub fn validate_quantity(quantity: i64) -> Result<(), &'static str> {
    if quantity <= 0 {
        return Err("Quantity must be positive");
    }
    Ok(())
}

/// Validate a reorder point is non-negative
pub fn validate_reorder_point(reorder_point: i64) -> Result<(), &'static str> {
    if reorder_point < 0 {
        return Err("Reorder point cannot be negative");
    }
    Ok(())
}

/// Validate a price in integer minor units is non-negative
pub fn validate_price(price: i64) -> Result<(), &'static str> {
    if price < 0 {
        return Err("Price cannot be negative");
    }
    Ok(())
}

// ============================================================================
// General Validations
// ============================================================================

/// Validate email format (basic check)
pub fn validate_email(email: &str) -> Result<(), &'static str> {
    if email.contains('@') && email.contains('.') && email.len() >= 5 {
        Ok(())
    } else {
        Err("Invalid email format")
    }
}

/// Validate password strength
pub fn validate_password(password: &str) -> Result<(), &'static str> {
    if password.len() < 8 {
        return Err("Password must be at least 8 characters");
    }
    Ok(())
}
