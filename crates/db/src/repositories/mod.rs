pub mod tenant_repo;

pub use tenant_repo::{LookupStrategy, TenantRepo};
