//! Selection of the supplier record and price break that apply to a purchase.

use supplyerp_core::{DomainError, DomainResult};
use supplyerp_products::{ProductId, Uom};

use crate::matching::{Matchable, Pattern, sequence_order};
use crate::supplier::{ProductSupplier, ProductSupplierPrice};

/// Pick the price break of `offer` that applies to `quantity` of `uom`.
///
/// The quantity is converted once into the offer's purchase unit, without
/// rounding to that unit's precision, and compared against each break's
/// minimal quantity. Among eligible breaks the lowest
/// sequence wins (unsequenced last); ties go to the higher minimal quantity,
/// then to the earlier break.
///
/// Returns `Ok(None)` when no break applies. Units from different categories
/// fail with [`DomainError::Conversion`].
pub fn select_price_break<'a>(
    offer: &'a ProductSupplier,
    quantity: f64,
    uom: &Uom,
    pattern: &Pattern,
) -> DomainResult<Option<&'a ProductSupplierPrice>> {
    if !offer.is_active() {
        return Err(DomainError::not_found());
    }
    if !quantity.is_finite() || quantity <= 0.0 {
        return Err(DomainError::validation("quantity must be positive"));
    }
    let native = offer
        .uom()
        .ok_or_else(|| DomainError::invariant("product supplier has no purchase unit"))?;

    let converted = Uom::compute_qty(uom, quantity, native, false)?;

    let selected = offer
        .prices()
        .iter()
        .filter(|price| price.quantity <= converted && price.matches(pattern))
        .min_by(|a, b| {
            sequence_order(a.sequence, b.sequence)
                .then_with(|| b.quantity.total_cmp(&a.quantity))
        });

    tracing::debug!(
        product_supplier = %offer.id_typed(),
        quantity,
        converted,
        price = ?selected.map(|p| p.id),
        "selected price break"
    );

    Ok(selected)
}

/// Pick the supplier record to buy `product` from.
///
/// Only active records of `product` matching `pattern` are considered; the
/// lowest sequence wins (unsequenced last), ties keep the input order.
pub fn select_offer<'a, I>(offers: I, product: ProductId, pattern: &Pattern) -> Option<&'a ProductSupplier>
where
    I: IntoIterator<Item = &'a ProductSupplier>,
{
    let selected = offers
        .into_iter()
        .filter(|offer| offer.is_active() && offer.product() == Some(product))
        .filter(|offer| offer.matches(pattern))
        .min_by(|a, b| sequence_order(a.sequence(), b.sequence()));

    tracing::debug!(
        product = %product,
        product_supplier = ?selected.map(ProductSupplier::id_typed),
        "selected product supplier"
    );

    selected
}

/// Sort supplier records by sequence, unsequenced last, keeping input order on ties.
pub(crate) fn sort_offers(offers: &mut [&ProductSupplier]) {
    offers.sort_by(|a, b| sequence_order(a.sequence(), b.sequence()));
}
