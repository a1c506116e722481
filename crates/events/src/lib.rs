//! Domain events emitted by the purchasing and product aggregates.

pub mod event;

pub use event::Event;
