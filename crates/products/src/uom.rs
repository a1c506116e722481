//! Units of measure and conversions between them.
//!
//! Every unit belongs to a category (length, weight, unit, ...) and declares a
//! `factor` relative to the category's reference unit: `1 <unit> = factor
//! <reference>`. Conversions are only defined inside a category.

use rust_decimal::Decimal;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use serde::{Deserialize, Serialize};

use supplyerp_core::{DomainError, DomainResult, Entity, typed_id};

typed_id!(
    /// Unit of measure category identifier.
    UomCategoryId
);

typed_id!(
    /// Unit of measure identifier.
    UomId
);

/// A unit of measure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Uom {
    id: UomId,
    category: UomCategoryId,
    name: String,
    symbol: String,
    factor: f64,
    rounding: f64,
}

impl Uom {
    pub fn new(
        id: UomId,
        category: UomCategoryId,
        name: impl Into<String>,
        symbol: impl Into<String>,
        factor: f64,
        rounding: f64,
    ) -> DomainResult<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DomainError::validation("unit name cannot be empty"));
        }
        if !factor.is_finite() || factor <= 0.0 {
            return Err(DomainError::validation(format!(
                "unit factor must be positive, got {factor}"
            )));
        }
        if !rounding.is_finite() || rounding <= 0.0 {
            return Err(DomainError::validation(format!(
                "unit rounding must be positive, got {rounding}"
            )));
        }
        Ok(Self {
            id,
            category,
            name,
            symbol: symbol.into(),
            factor,
            rounding,
        })
    }

    pub fn id_typed(&self) -> UomId {
        self.id
    }

    pub fn category(&self) -> UomCategoryId {
        self.category
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn factor(&self) -> f64 {
        self.factor
    }

    pub fn rounding(&self) -> f64 {
        self.rounding
    }

    /// Round a quantity to this unit's rounding precision.
    pub fn round(&self, value: f64) -> f64 {
        let (Some(value_dec), Some(precision)) =
            (Decimal::from_f64(value), Decimal::from_f64(self.rounding))
        else {
            return value;
        };
        let rounded = (value_dec / precision).round() * precision;
        rounded.to_f64().unwrap_or(value)
    }

    fn ensure_same_category(from: &Uom, to: &Uom) -> DomainResult<()> {
        if from.category != to.category {
            return Err(DomainError::conversion(format!(
                "cannot convert from {} to {}: units belong to different categories",
                from.name, to.name
            )));
        }
        Ok(())
    }

    /// Convert `qty` expressed in `from` into `to`.
    ///
    /// With `round`, the result is rounded to the precision of `to`.
    pub fn compute_qty(from: &Uom, qty: f64, to: &Uom, round: bool) -> DomainResult<f64> {
        Self::ensure_same_category(from, to)?;
        if qty == 0.0 {
            return Ok(qty);
        }
        let amount = qty * from.factor / to.factor;
        Ok(if round { to.round(amount) } else { amount })
    }

    /// Convert a price per `from` into a price per `to`.
    pub fn compute_price(from: &Uom, price: Decimal, to: &Uom) -> DomainResult<Decimal> {
        Self::ensure_same_category(from, to)?;
        if from.id == to.id {
            return Ok(price);
        }
        let from_factor = Decimal::from_f64(from.factor)
            .ok_or_else(|| DomainError::conversion(format!("unrepresentable factor on {}", from.name)))?;
        let to_factor = Decimal::from_f64(to.factor)
            .ok_or_else(|| DomainError::conversion(format!("unrepresentable factor on {}", to.name)))?;
        Ok(price / from_factor * to_factor)
    }
}

impl Entity for Uom {
    type Id = UomId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
