//! Products domain module.
//!
//! Templates carry the shared product definition (name, units, purchasable
//! flag, cost price); variants are the concrete purchasable items. Pure domain
//! logic, no IO.

pub mod catalog;
pub mod product;
pub mod template;
pub mod uom;

pub use catalog::{ClauseOperator, ProductCatalog, VariantView};
pub use product::{Product, ProductId};
pub use template::{
    CreateTemplate, ProductTemplate, PurchasableChanged, SetPurchasable, TemplateCommand,
    TemplateCreated, TemplateEvent, TemplateId,
};
pub use uom::{Uom, UomCategoryId, UomId};
