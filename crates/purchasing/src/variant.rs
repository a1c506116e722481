//! Supplier records attached to product variants.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use supplyerp_core::{Currency, DomainError, DomainResult};
use supplyerp_products::{Uom, VariantView};

use crate::context::RequestContext;
use crate::matcher::{select_offer, select_price_break, sort_offers};
use crate::matching::{Matchable, Pattern};
use crate::supplier::{PRICE_DIGITS, ProductSupplier, ProductSupplierId, ProductSupplierPriceId};

/// A purchasable item that carries its own supplier records.
pub trait HasSuppliers {
    fn product_suppliers(&self) -> &[ProductSupplier];

    /// Active supplier records matching `pattern`, in sequence order.
    fn product_suppliers_used(&self, pattern: &Pattern) -> Vec<&ProductSupplier> {
        let mut used: Vec<&ProductSupplier> = self
            .product_suppliers()
            .iter()
            .filter(|s| s.is_active() && s.matches(pattern))
            .collect();
        sort_offers(&mut used);
        used
    }
}

/// Where a purchase price came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum PriceSource {
    Supplier {
        product_supplier: ProductSupplierId,
        price: ProductSupplierPriceId,
    },
    Template,
}

/// Unit price for a purchase, expressed per requested unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchasePrice {
    pub unit_price: Decimal,
    pub currency: Currency,
    pub source: PriceSource,
}

/// A product variant together with its supplier records.
#[derive(Debug, Clone)]
pub struct SuppliedVariant<'a> {
    variant: VariantView<'a>,
    suppliers: Vec<ProductSupplier>,
}

impl<'a> SuppliedVariant<'a> {
    pub fn new(variant: VariantView<'a>) -> Self {
        Self {
            variant,
            suppliers: Vec::new(),
        }
    }

    /// Attach a supplier record; it must belong to this variant.
    pub fn add_supplier(&mut self, supplier: ProductSupplier) -> DomainResult<()> {
        if supplier.product() != Some(self.variant.id()) {
            return Err(DomainError::invariant(format!(
                "product supplier {} does not belong to product {}",
                supplier.id_typed(),
                self.variant.id()
            )));
        }
        if self.suppliers.iter().any(|s| s.id_typed() == supplier.id_typed()) {
            return Err(DomainError::conflict("product supplier already attached"));
        }
        self.suppliers.push(supplier);
        Ok(())
    }

    pub fn variant(&self) -> &VariantView<'a> {
        &self.variant
    }

    pub fn purchasable_variant(&self) -> bool {
        self.variant.purchasable_variant()
    }

    /// Unit price to buy `quantity` of `uom`.
    ///
    /// Uses the supplier record selected for the context's supplier and its
    /// applicable price break; otherwise falls back to the template cost price
    /// in the company currency. `Ok(None)` when neither is available.
    pub fn purchase_price(
        &self,
        quantity: f64,
        uom: &Uom,
        ctx: &RequestContext,
    ) -> DomainResult<Option<PurchasePrice>> {
        let pattern = ProductSupplier::get_pattern(ctx);

        if let Some(offer) = select_offer(&self.suppliers, self.variant.id(), &pattern) {
            if let Some(price) = select_price_break(offer, quantity, uom, &pattern)? {
                let (Some(offer_uom), Some(currency)) = (offer.uom(), offer.currency()) else {
                    return Err(DomainError::invariant("active product supplier is incomplete"));
                };
                let unit_price = Uom::compute_price(offer_uom, price.unit_price, uom)?
                    .round_dp(PRICE_DIGITS);
                tracing::debug!(
                    product = %self.variant.id(),
                    product_supplier = %offer.id_typed(),
                    %unit_price,
                    "purchase price from supplier"
                );
                return Ok(Some(PurchasePrice {
                    unit_price,
                    currency: currency.clone(),
                    source: PriceSource::Supplier {
                        product_supplier: offer.id_typed(),
                        price: price.id,
                    },
                }));
            }
        }

        let (Some(default_uom), Some(currency)) =
            (self.variant.default_uom(), ctx.company_currency.as_ref())
        else {
            tracing::debug!(product = %self.variant.id(), "no purchase price available");
            return Ok(None);
        };
        let unit_price = Uom::compute_price(default_uom, self.variant.template().cost_price(), uom)?
            .round_dp(PRICE_DIGITS);
        tracing::debug!(
            product = %self.variant.id(),
            %unit_price,
            "purchase price from template cost"
        );
        Ok(Some(PurchasePrice {
            unit_price,
            currency: currency.clone(),
            source: PriceSource::Template,
        }))
    }

    /// Earliest date goods ordered today can arrive from a matching supplier.
    pub fn supply_date(&self, ctx: &RequestContext) -> NaiveDate {
        self.product_suppliers_used(&ProductSupplier::get_pattern(ctx))
            .into_iter()
            .map(|s| s.compute_supply_date(None, ctx))
            .min()
            .unwrap_or(NaiveDate::MAX)
    }
}

impl HasSuppliers for SuppliedVariant<'_> {
    fn product_suppliers(&self) -> &[ProductSupplier] {
        &self.suppliers
    }
}
