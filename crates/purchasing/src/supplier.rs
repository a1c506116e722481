use chrono::{DateTime, Days, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use supplyerp_core::{Aggregate, AggregateRoot, CompanyId, Currency, DomainError, typed_id};
use supplyerp_events::Event;
use supplyerp_parties::{Party, PartyId};
use supplyerp_products::{ProductId, Uom, VariantView};

use crate::context::RequestContext;
use crate::matching::{AttributeValue, Matchable, Pattern};

/// Decimal places unit prices are stored with.
pub const PRICE_DIGITS: u32 = 4;

typed_id!(
    /// Identifier of a supplier record for a product variant.
    ProductSupplierId
);

typed_id!(
    /// Identifier of a price break inside a supplier record.
    ProductSupplierPriceId
);

/// A price break: the unit price that applies from a minimum quantity on.
///
/// `quantity` is expressed in the purchase unit of the owning supplier record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductSupplierPrice {
    pub id: ProductSupplierPriceId,
    pub product_supplier: ProductSupplierId,
    pub quantity: f64,
    pub unit_price: Decimal,
    pub sequence: Option<i32>,
}

impl Matchable for ProductSupplierPrice {
    fn matchable_fields(&self) -> &'static [&'static str] {
        &[]
    }

    fn attribute(&self, _name: &str) -> Option<AttributeValue> {
        None
    }
}

/// Aggregate root: ProductSupplier (a supplier's offer for one product variant).
///
/// Owns its price breaks; deleting the record drops them.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductSupplier {
    id: ProductSupplierId,
    product: Option<ProductId>,
    party: Option<PartyId>,
    company: Option<CompanyId>,
    name: Option<String>,
    code: Option<String>,
    sequence: Option<i32>,
    delivery_time: Option<u32>,
    currency: Option<Currency>,
    uom: Option<Uom>,
    prices: Vec<ProductSupplierPrice>,
    version: u64,
    created: bool,
    deleted: bool,
}

impl ProductSupplier {
    /// Create an empty, not-yet-created aggregate instance for rehydration.
    pub fn empty(id: ProductSupplierId) -> Self {
        Self {
            id,
            product: None,
            party: None,
            company: None,
            name: None,
            code: None,
            sequence: None,
            delivery_time: None,
            currency: None,
            uom: None,
            prices: Vec::new(),
            version: 0,
            created: false,
            deleted: false,
        }
    }

    pub fn id_typed(&self) -> ProductSupplierId {
        self.id
    }

    pub fn product(&self) -> Option<ProductId> {
        self.product
    }

    pub fn party(&self) -> Option<PartyId> {
        self.party
    }

    pub fn company(&self) -> Option<CompanyId> {
        self.company
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn code(&self) -> Option<&str> {
        self.code.as_deref()
    }

    pub fn sequence(&self) -> Option<i32> {
        self.sequence
    }

    /// Lead time in days; `None` means unknown.
    pub fn delivery_time(&self) -> Option<u32> {
        self.delivery_time
    }

    pub fn currency(&self) -> Option<&Currency> {
        self.currency.as_ref()
    }

    /// Purchase unit the price break quantities are expressed in.
    pub fn uom(&self) -> Option<&Uom> {
        self.uom.as_ref()
    }

    /// Price breaks in insertion order.
    pub fn prices(&self) -> &[ProductSupplierPrice] {
        &self.prices
    }

    pub fn price(&self, price_id: ProductSupplierPriceId) -> Option<&ProductSupplierPrice> {
        self.prices.iter().find(|p| p.id == price_id)
    }

    /// Created and not deleted.
    pub fn is_active(&self) -> bool {
        self.created && !self.deleted
    }

    /// Pattern for the supplier named in the context, if any.
    pub fn get_pattern(ctx: &RequestContext) -> Pattern {
        Pattern::new().with_optional("party", ctx.supplier.map(AttributeValue::Party))
    }

    fn ensure_product(&self, product: &VariantView<'_>) -> Result<(), DomainError> {
        if self.product != Some(product.id()) {
            return Err(DomainError::invariant(format!(
                "product supplier {} does not belong to product {}",
                self.id,
                product.id()
            )));
        }
        Ok(())
    }

    fn ensure_party(&self, party: &Party) -> Result<(), DomainError> {
        if self.party != Some(party.id_typed()) {
            return Err(DomainError::invariant(format!(
                "product supplier {} is not supplied by party {}",
                self.id,
                party.id_typed()
            )));
        }
        Ok(())
    }

    /// Supplier-facing label: `[code] name`, falling back to the product name.
    pub fn supplier_name(&self, product: &VariantView<'_>) -> Result<Option<String>, DomainError> {
        self.ensure_product(product)?;
        Ok(match (self.code.as_deref(), self.name.as_deref()) {
            (Some(code), Some(name)) => Some(format!("[{code}] {name}")),
            (Some(code), None) => Some(format!("[{code}] {}", product.name())),
            (None, Some(name)) => Some(name.to_string()),
            (None, None) => None,
        })
    }

    pub fn rec_name(&self, product: &VariantView<'_>, party: &Party) -> Result<String, DomainError> {
        self.ensure_product(product)?;
        self.ensure_party(party)?;
        Ok(format!("{} @ {}", product.rec_name(), party.rec_name()))
    }

    /// Text search over the product and supplier names.
    ///
    /// A query prefixed with `!` or `not ` matches records where neither name
    /// contains the rest of the query.
    pub fn matches_rec_name(
        &self,
        query: &str,
        product: &VariantView<'_>,
        party: &Party,
    ) -> Result<bool, DomainError> {
        self.ensure_product(product)?;
        self.ensure_party(party)?;
        let (negated, needle) = match query
            .strip_prefix('!')
            .or_else(|| query.strip_prefix("not "))
        {
            Some(rest) => (true, rest),
            None => (false, query),
        };
        let needle = needle.to_lowercase();
        let in_product = product.rec_name().to_lowercase().contains(&needle);
        let in_party = party.rec_name().to_lowercase().contains(&needle);
        Ok(if negated {
            !in_product && !in_party
        } else {
            in_product || in_party
        })
    }

    /// Date goods ordered on `date` (default: today) arrive.
    ///
    /// Unknown lead time yields `NaiveDate::MAX` so such offers sort last.
    pub fn compute_supply_date(&self, date: Option<NaiveDate>, ctx: &RequestContext) -> NaiveDate {
        let Some(days) = self.delivery_time else {
            return NaiveDate::MAX;
        };
        date.unwrap_or(ctx.today)
            .checked_add_days(Days::new(u64::from(days)))
            .unwrap_or(NaiveDate::MAX)
    }

    /// Latest date to order so goods arrive by `date`.
    ///
    /// Unknown lead time yields today.
    pub fn compute_purchase_date(&self, date: NaiveDate, ctx: &RequestContext) -> NaiveDate {
        let Some(days) = self.delivery_time else {
            return ctx.today;
        };
        date.checked_sub_days(Days::new(u64::from(days)))
            .unwrap_or(NaiveDate::MIN)
    }
}

impl Matchable for ProductSupplier {
    fn matchable_fields(&self) -> &'static [&'static str] {
        &["party"]
    }

    fn attribute(&self, name: &str) -> Option<AttributeValue> {
        match name {
            "party" => self.party.map(AttributeValue::Party),
            _ => None,
        }
    }
}

impl AggregateRoot for ProductSupplier {
    type Id = ProductSupplierId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

/// Command: CreateProductSupplier.
///
/// `company` and `currency` default to the context's company and its currency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateProductSupplier {
    pub supplier_id: ProductSupplierId,
    pub product: Option<ProductId>,
    pub purchase_uom: Option<Uom>,
    pub party: Option<PartyId>,
    pub company: Option<CompanyId>,
    pub currency: Option<Currency>,
    pub name: Option<String>,
    pub code: Option<String>,
    pub sequence: Option<i32>,
    pub delivery_time: Option<u32>,
    pub context: RequestContext,
    pub occurred_at: DateTime<Utc>,
}

/// Command: UpdateProductSupplier (replaces the editable fields).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateProductSupplier {
    pub supplier_id: ProductSupplierId,
    pub name: Option<String>,
    pub code: Option<String>,
    pub sequence: Option<i32>,
    pub delivery_time: Option<u32>,
    pub currency: Currency,
    pub occurred_at: DateTime<Utc>,
}

/// Command: AddPrice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddPrice {
    pub supplier_id: ProductSupplierId,
    pub price_id: ProductSupplierPriceId,
    pub quantity: f64,
    pub unit_price: Decimal,
    pub sequence: Option<i32>,
    pub occurred_at: DateTime<Utc>,
}

impl AddPrice {
    /// Price break applying from quantity 0, without a sequence.
    pub fn new(
        supplier_id: ProductSupplierId,
        price_id: ProductSupplierPriceId,
        unit_price: Decimal,
        occurred_at: DateTime<Utc>,
    ) -> Self {
        Self {
            supplier_id,
            price_id,
            quantity: 0.0,
            unit_price,
            sequence: None,
            occurred_at,
        }
    }

    pub fn from_quantity(mut self, quantity: f64) -> Self {
        self.quantity = quantity;
        self
    }

    pub fn with_sequence(mut self, sequence: i32) -> Self {
        self.sequence = Some(sequence);
        self
    }
}

/// Command: UpdatePrice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdatePrice {
    pub supplier_id: ProductSupplierId,
    pub price_id: ProductSupplierPriceId,
    pub quantity: f64,
    pub unit_price: Decimal,
    pub sequence: Option<i32>,
    pub occurred_at: DateTime<Utc>,
}

/// Command: RemovePrice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemovePrice {
    pub supplier_id: ProductSupplierId,
    pub price_id: ProductSupplierPriceId,
    pub occurred_at: DateTime<Utc>,
}

/// Command: DeleteProductSupplier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeleteProductSupplier {
    pub supplier_id: ProductSupplierId,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ProductSupplierCommand {
    CreateProductSupplier(CreateProductSupplier),
    UpdateProductSupplier(UpdateProductSupplier),
    AddPrice(AddPrice),
    UpdatePrice(UpdatePrice),
    RemovePrice(RemovePrice),
    DeleteProductSupplier(DeleteProductSupplier),
}

/// Event: ProductSupplierCreated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductSupplierCreated {
    pub supplier_id: ProductSupplierId,
    pub product: ProductId,
    pub purchase_uom: Uom,
    pub party: PartyId,
    pub company: CompanyId,
    pub currency: Currency,
    pub name: Option<String>,
    pub code: Option<String>,
    pub sequence: Option<i32>,
    pub delivery_time: Option<u32>,
    pub occurred_at: DateTime<Utc>,
}

/// Event: ProductSupplierUpdated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductSupplierUpdated {
    pub supplier_id: ProductSupplierId,
    pub name: Option<String>,
    pub code: Option<String>,
    pub sequence: Option<i32>,
    pub delivery_time: Option<u32>,
    pub currency: Currency,
    pub occurred_at: DateTime<Utc>,
}

/// Event: PriceAdded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceAdded {
    pub supplier_id: ProductSupplierId,
    pub price_id: ProductSupplierPriceId,
    pub quantity: f64,
    pub unit_price: Decimal,
    pub sequence: Option<i32>,
    pub occurred_at: DateTime<Utc>,
}

/// Event: PriceUpdated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceUpdated {
    pub supplier_id: ProductSupplierId,
    pub price_id: ProductSupplierPriceId,
    pub quantity: f64,
    pub unit_price: Decimal,
    pub sequence: Option<i32>,
    pub occurred_at: DateTime<Utc>,
}

/// Event: PriceRemoved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceRemoved {
    pub supplier_id: ProductSupplierId,
    pub price_id: ProductSupplierPriceId,
    pub occurred_at: DateTime<Utc>,
}

/// Event: ProductSupplierDeleted.
///
/// Price breaks go with the record; no separate `PriceRemoved` is emitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductSupplierDeleted {
    pub supplier_id: ProductSupplierId,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ProductSupplierEvent {
    ProductSupplierCreated(ProductSupplierCreated),
    ProductSupplierUpdated(ProductSupplierUpdated),
    PriceAdded(PriceAdded),
    PriceUpdated(PriceUpdated),
    PriceRemoved(PriceRemoved),
    ProductSupplierDeleted(ProductSupplierDeleted),
}

impl Event for ProductSupplierEvent {
    fn event_type(&self) -> &'static str {
        match self {
            ProductSupplierEvent::ProductSupplierCreated(_) => "purchasing.product_supplier.created",
            ProductSupplierEvent::ProductSupplierUpdated(_) => "purchasing.product_supplier.updated",
            ProductSupplierEvent::PriceAdded(_) => "purchasing.product_supplier.price_added",
            ProductSupplierEvent::PriceUpdated(_) => "purchasing.product_supplier.price_updated",
            ProductSupplierEvent::PriceRemoved(_) => "purchasing.product_supplier.price_removed",
            ProductSupplierEvent::ProductSupplierDeleted(_) => "purchasing.product_supplier.deleted",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            ProductSupplierEvent::ProductSupplierCreated(e) => e.occurred_at,
            ProductSupplierEvent::ProductSupplierUpdated(e) => e.occurred_at,
            ProductSupplierEvent::PriceAdded(e) => e.occurred_at,
            ProductSupplierEvent::PriceUpdated(e) => e.occurred_at,
            ProductSupplierEvent::PriceRemoved(e) => e.occurred_at,
            ProductSupplierEvent::ProductSupplierDeleted(e) => e.occurred_at,
        }
    }
}

impl Aggregate for ProductSupplier {
    type Command = ProductSupplierCommand;
    type Event = ProductSupplierEvent;
    type Error = DomainError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            ProductSupplierEvent::ProductSupplierCreated(e) => {
                self.id = e.supplier_id;
                self.product = Some(e.product);
                self.uom = Some(e.purchase_uom.clone());
                self.party = Some(e.party);
                self.company = Some(e.company);
                self.currency = Some(e.currency.clone());
                self.name = e.name.clone();
                self.code = e.code.clone();
                self.sequence = e.sequence;
                self.delivery_time = e.delivery_time;
                self.prices.clear();
                self.created = true;
                self.deleted = false;
            }
            ProductSupplierEvent::ProductSupplierUpdated(e) => {
                self.name = e.name.clone();
                self.code = e.code.clone();
                self.sequence = e.sequence;
                self.delivery_time = e.delivery_time;
                self.currency = Some(e.currency.clone());
            }
            ProductSupplierEvent::PriceAdded(e) => {
                self.prices.push(ProductSupplierPrice {
                    id: e.price_id,
                    product_supplier: e.supplier_id,
                    quantity: e.quantity,
                    unit_price: e.unit_price,
                    sequence: e.sequence,
                });
            }
            ProductSupplierEvent::PriceUpdated(e) => {
                if let Some(price) = self.prices.iter_mut().find(|p| p.id == e.price_id) {
                    price.quantity = e.quantity;
                    price.unit_price = e.unit_price;
                    price.sequence = e.sequence;
                }
            }
            ProductSupplierEvent::PriceRemoved(e) => {
                self.prices.retain(|p| p.id != e.price_id);
            }
            ProductSupplierEvent::ProductSupplierDeleted(_) => {
                self.prices.clear();
                self.deleted = true;
            }
        }

        // Deterministic version tracking: +1 per applied event.
        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            ProductSupplierCommand::CreateProductSupplier(cmd) => self.handle_create(cmd),
            ProductSupplierCommand::UpdateProductSupplier(cmd) => self.handle_update(cmd),
            ProductSupplierCommand::AddPrice(cmd) => self.handle_add_price(cmd),
            ProductSupplierCommand::UpdatePrice(cmd) => self.handle_update_price(cmd),
            ProductSupplierCommand::RemovePrice(cmd) => self.handle_remove_price(cmd),
            ProductSupplierCommand::DeleteProductSupplier(cmd) => self.handle_delete(cmd),
        }
    }
}

fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn validate_price(quantity: f64, unit_price: Decimal) -> Result<Decimal, DomainError> {
    if !quantity.is_finite() || quantity < 0.0 {
        return Err(DomainError::validation("minimal quantity cannot be negative"));
    }
    if unit_price.is_sign_negative() {
        return Err(DomainError::validation("unit price cannot be negative"));
    }
    Ok(unit_price.round_dp(PRICE_DIGITS))
}

impl ProductSupplier {
    fn ensure_active(&self, supplier_id: ProductSupplierId) -> Result<(), DomainError> {
        if !self.is_active() {
            return Err(DomainError::not_found());
        }
        if self.id != supplier_id {
            return Err(DomainError::invariant("supplier_id mismatch"));
        }
        Ok(())
    }

    fn handle_create(
        &self,
        cmd: &CreateProductSupplier,
    ) -> Result<Vec<ProductSupplierEvent>, DomainError> {
        if self.created {
            return Err(DomainError::conflict("product supplier already exists"));
        }

        let product = cmd
            .product
            .ok_or_else(|| DomainError::validation("product is required"))?;
        let purchase_uom = cmd
            .purchase_uom
            .clone()
            .ok_or_else(|| DomainError::validation("product purchase unit is required"))?;
        let party = cmd
            .party
            .ok_or_else(|| DomainError::validation("supplier is required"))?;
        let company = cmd
            .company
            .or(cmd.context.company)
            .ok_or_else(|| DomainError::validation("company is required"))?;
        let currency = cmd
            .currency
            .clone()
            .or_else(|| cmd.context.company_currency.clone())
            .ok_or_else(|| DomainError::validation("currency is required"))?;

        // Records are only created for the company the request acts for.
        if let Some(context_company) = cmd.context.company {
            if context_company != company {
                return Err(DomainError::invariant(
                    "company must be the company of the request context",
                ));
            }
        }

        Ok(vec![ProductSupplierEvent::ProductSupplierCreated(
            ProductSupplierCreated {
                supplier_id: cmd.supplier_id,
                product,
                purchase_uom,
                party,
                company,
                currency,
                name: non_blank(&cmd.name),
                code: non_blank(&cmd.code),
                sequence: cmd.sequence,
                delivery_time: cmd.delivery_time,
                occurred_at: cmd.occurred_at,
            },
        )])
    }

    fn handle_update(
        &self,
        cmd: &UpdateProductSupplier,
    ) -> Result<Vec<ProductSupplierEvent>, DomainError> {
        self.ensure_active(cmd.supplier_id)?;

        Ok(vec![ProductSupplierEvent::ProductSupplierUpdated(
            ProductSupplierUpdated {
                supplier_id: cmd.supplier_id,
                name: non_blank(&cmd.name),
                code: non_blank(&cmd.code),
                sequence: cmd.sequence,
                delivery_time: cmd.delivery_time,
                currency: cmd.currency.clone(),
                occurred_at: cmd.occurred_at,
            },
        )])
    }

    fn handle_add_price(&self, cmd: &AddPrice) -> Result<Vec<ProductSupplierEvent>, DomainError> {
        self.ensure_active(cmd.supplier_id)?;

        if self.price(cmd.price_id).is_some() {
            return Err(DomainError::conflict("price already exists"));
        }
        let unit_price = validate_price(cmd.quantity, cmd.unit_price)?;

        Ok(vec![ProductSupplierEvent::PriceAdded(PriceAdded {
            supplier_id: cmd.supplier_id,
            price_id: cmd.price_id,
            quantity: cmd.quantity,
            unit_price,
            sequence: cmd.sequence,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_update_price(
        &self,
        cmd: &UpdatePrice,
    ) -> Result<Vec<ProductSupplierEvent>, DomainError> {
        self.ensure_active(cmd.supplier_id)?;

        if self.price(cmd.price_id).is_none() {
            return Err(DomainError::not_found());
        }
        let unit_price = validate_price(cmd.quantity, cmd.unit_price)?;

        Ok(vec![ProductSupplierEvent::PriceUpdated(PriceUpdated {
            supplier_id: cmd.supplier_id,
            price_id: cmd.price_id,
            quantity: cmd.quantity,
            unit_price,
            sequence: cmd.sequence,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_remove_price(
        &self,
        cmd: &RemovePrice,
    ) -> Result<Vec<ProductSupplierEvent>, DomainError> {
        self.ensure_active(cmd.supplier_id)?;

        if self.price(cmd.price_id).is_none() {
            return Err(DomainError::not_found());
        }

        Ok(vec![ProductSupplierEvent::PriceRemoved(PriceRemoved {
            supplier_id: cmd.supplier_id,
            price_id: cmd.price_id,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_delete(
        &self,
        cmd: &DeleteProductSupplier,
    ) -> Result<Vec<ProductSupplierEvent>, DomainError> {
        self.ensure_active(cmd.supplier_id)?;

        Ok(vec![ProductSupplierEvent::ProductSupplierDeleted(
            ProductSupplierDeleted {
                supplier_id: cmd.supplier_id,
                occurred_at: cmd.occurred_at,
            },
        )])
    }
}
