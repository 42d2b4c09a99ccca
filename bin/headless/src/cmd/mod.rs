//! Command implementations.

pub mod about;
pub mod check;
pub mod publish;
