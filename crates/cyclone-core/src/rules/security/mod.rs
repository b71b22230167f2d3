//! Security rules for deserialization hazards

pub mod reference_cycle;

pub use reference_cycle::ReferenceCycle;
