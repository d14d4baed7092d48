//! Schema-validated generation client: wraps an opaque text-generation
//! capability, validates returned text against an expected structure,
//! and retries with a progressively repaired prompt.

pub mod client;
pub mod errors;
pub mod generator;
pub mod validate;

pub use client::*;
pub use errors::*;
pub use generator::*;
pub use validate::*;
