//! `supplyerp-core` — shared domain building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns):
//! identifiers, the domain error model, and the small traits every ERP module
//! builds its records on.

pub mod aggregate;
pub mod currency;
pub mod entity;
pub mod error;
pub mod id;
pub mod value_object;

pub use aggregate::{Aggregate, AggregateRoot};
pub use currency::Currency;
pub use entity::Entity;
pub use error::{DomainError, DomainResult};
pub use id::{AggregateId, CompanyId};
pub use value_object::ValueObject;
