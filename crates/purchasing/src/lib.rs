//! Purchasing domain module: supplier offers and price breaks per product
//! variant.
//!
//! Business rules only (no IO, no HTTP, no storage): the supplier record
//! aggregate, the matcher that picks an offer and a price break for a
//! purchase, and the lead-time date helpers.

pub mod context;
pub mod matcher;
pub mod matching;
pub mod supplier;
pub mod variant;

pub use context::RequestContext;
pub use matcher::{select_offer, select_price_break};
pub use matching::{AttributeValue, Matchable, Pattern, sequence_order};
pub use supplier::{
    AddPrice, CreateProductSupplier, DeleteProductSupplier, PRICE_DIGITS, PriceAdded,
    PriceRemoved, PriceUpdated, ProductSupplier, ProductSupplierCommand, ProductSupplierCreated,
    ProductSupplierDeleted, ProductSupplierEvent, ProductSupplierId, ProductSupplierPrice,
    ProductSupplierPriceId, ProductSupplierUpdated, RemovePrice, UpdatePrice,
    UpdateProductSupplier,
};
pub use variant::{HasSuppliers, PriceSource, PurchasePrice, SuppliedVariant};
