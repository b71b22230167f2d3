//! Static detection of reference cycles in deserialized object graphs
//!
//! The crate analyzes an already-resolved [`model::SymbolModel`] and reports
//! data members of serializable types that can lead back to the type that
//! carries them.

pub mod analysis;
pub mod config;
pub mod cycles;
pub mod diagnostic;
pub mod model;
pub mod rules;
