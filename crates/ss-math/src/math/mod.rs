//! Core math modules.

pub mod gaussian;
pub mod rolling;
pub mod stable;
pub mod vector;
