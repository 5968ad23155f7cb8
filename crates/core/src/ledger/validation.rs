//! Input normalization shared by every ledger operation.

use crate::errors::{Error, Result};

/// Trim and upper-case a symbol. Empty symbols are rejected.
pub fn normalize_symbol(raw: &str) -> Result<String> {
    let symbol = raw.trim().to_uppercase();
    if symbol.is_empty() {
        return Err(Error::ConstraintViolation(
            "symbol must not be empty".to_string(),
        ));
    }
    Ok(symbol)
}

/// Trim and upper-case a currency code, falling back to `default` when empty.
pub fn normalize_currency(raw: &str, default: &str) -> String {
    let currency = raw.trim();
    if currency.is_empty() {
        default.trim().to_uppercase()
    } else {
        currency.to_uppercase()
    }
}

pub(crate) fn ensure_finite(field: &str, value: f64) -> Result<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(Error::ConstraintViolation(format!(
            "{} must be a finite number, got {}",
            field, value
        )))
    }
}

pub(crate) fn ensure_price(value: f64) -> Result<f64> {
    let price = ensure_finite("price", value)?;
    if price < 0.0 {
        return Err(Error::ConstraintViolation(format!(
            "price must not be negative, got {}",
            price
        )));
    }
    Ok(price)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_symbol_trims_and_uppercases() {
        assert_eq!(normalize_symbol("  shop.trt ").unwrap(), "SHOP.TRT");
    }

    #[test]
    fn test_normalize_symbol_rejects_blank() {
        assert!(normalize_symbol("").unwrap_err().is_constraint_violation());
        assert!(normalize_symbol("   ").unwrap_err().is_constraint_violation());
    }

    #[test]
    fn test_normalize_currency_defaults_when_blank() {
        assert_eq!(normalize_currency("", "cad"), "CAD");
        assert_eq!(normalize_currency(" usd ", "CAD"), "USD");
    }

    #[test]
    fn test_ensure_finite() {
        assert_eq!(ensure_finite("quantity", -3.5).unwrap(), -3.5);
        assert!(ensure_finite("quantity", f64::NAN).is_err());
        assert!(ensure_finite("quantity", f64::INFINITY).is_err());
    }

    #[test]
    fn test_ensure_price() {
        assert_eq!(ensure_price(0.0).unwrap(), 0.0);
        assert!(ensure_price(-0.01).unwrap_err().is_constraint_violation());
        assert!(ensure_price(f64::NEG_INFINITY).is_err());
    }
}
