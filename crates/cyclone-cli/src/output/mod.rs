//! Report formatters for `cyclone check`

pub mod json;
pub mod sarif;
pub mod text;
