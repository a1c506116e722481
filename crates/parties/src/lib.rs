//! Parties domain module.
//!
//! Suppliers are referenced by purchasing records; this crate only carries
//! what those records read from a party (identity, name, code).

pub mod party;

pub use party::{Party, PartyId};
