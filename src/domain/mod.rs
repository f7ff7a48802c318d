//! Domain layer types and invariants.

pub mod documents;
pub mod entities;
pub mod error;
pub mod farms;
pub mod harvests;
