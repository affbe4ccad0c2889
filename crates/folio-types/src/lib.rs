//! Folio Types - Shared domain types
//!
//! This crate contains domain types used across Folio crates:
//! - Principal identity
//! - Articles and partial updates
//! - Pagination filters and page envelopes

pub mod article;
pub mod error;
pub mod page;
pub mod principal;

pub use article::*;
pub use error::*;
pub use page::*;
pub use principal::*;
