//! Cross-layer integration tests.

pub mod flows;
pub mod matrix;
