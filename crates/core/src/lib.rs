//! Domain types and rules for the gridfund platform.
//!
//! This crate has no internal dependencies so it can be used by the
//! repository layer, the API crate, and any future CLI tooling.

pub mod claim;
pub mod error;
pub mod pagination;
pub mod pricing;
pub mod roles;
pub mod types;
