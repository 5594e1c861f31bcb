//! Well-known OCCI category catalogs.
//!
//! Each sub-module encodes the categories of one scheme as Rust data and is
//! loaded into a [`Model`](crate::Model) by the bootstrap phases in
//! dependency order: `core → infrastructure → infrastructure_ext`. See
//! [`Model::bootstrap`](crate::Model::bootstrap).

pub mod core;
pub mod infrastructure;
pub mod infrastructure_ext;
