//! Domain logic for tenant resolution and per-tenant config generation.
//!
//! This crate is I/O-free apart from template file reads: identifying a
//! tenant from a host or CLI context, modelling the generated parameter
//! set, and merging directory records into a validated configuration.
//! Database access and filesystem persistence live in `tenantgate-db`
//! and `tenantgate-provision`.

pub mod directory;
pub mod error;
pub mod generator;
pub mod identity;
pub mod params;
pub mod record;
pub mod secret;
pub mod template;
