//! Artifact provisioning and request resolution.
//!
//! This crate owns everything between "we know the tenant key" and
//! "the framework has a config file to load": the on-disk artifact
//! layout, the cache-hit short-circuit, cross-process mutual exclusion
//! while generating, atomic persistence, and the per-request resolver
//! that ties identification, lookup, and generation together.

pub mod layout;
pub mod lock;
pub mod resolver;
pub mod store;

pub use layout::ArtifactLayout;
pub use resolver::{Outcome, RequestConfigResolver, Resolution};
pub use store::{ConfigArtifactStore, ResolvedArtifact};
