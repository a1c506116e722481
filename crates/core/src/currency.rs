//! Currency value object.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};
use crate::value_object::ValueObject;

/// A currency: ISO 4217 code plus the number of decimal digits amounts are
/// rounded to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Currency {
    code: String,
    digits: u32,
}

impl ValueObject for Currency {}

impl Currency {
    pub fn new(code: impl Into<String>, digits: u32) -> DomainResult<Self> {
        let code = code.into();
        if code.len() != 3 || !code.chars().all(|c| c.is_ascii_uppercase()) {
            return Err(DomainError::validation(format!(
                "currency code must be three uppercase letters, got {code:?}"
            )));
        }
        if digits > 8 {
            return Err(DomainError::validation("currency digits must be at most 8"));
        }
        Ok(Self { code, digits })
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn digits(&self) -> u32 {
        self.digits
    }

    /// Round an amount to this currency's precision (banker's rounding).
    pub fn round(&self, amount: Decimal) -> Decimal {
        amount.round_dp(self.digits)
    }
}

impl core::fmt::Display for Currency {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.code)
    }
}
