//! Default configuration template loading.
//!
//! The template is a PHP parameters document read *declaratively* by
//! the [`crate::params`] parser; nothing is ever executed, so loading
//! cannot produce output or mutate process state. A successful load is
//! always a full default parameter set, never a partial one.

use std::path::Path;

use crate::error::ProvisionError;
use crate::params::{self, ParamMap};

/// Load the default parameter template from `path`.
///
/// Fails with [`ProvisionError::TemplateInvalid`] when the file is
/// missing, unreadable, unparseable, or parses to an empty mapping.
pub fn load(path: &Path) -> Result<ParamMap, ProvisionError> {
    let raw = std::fs::read_to_string(path).map_err(|e| {
        ProvisionError::TemplateInvalid(format!("cannot read {}: {e}", path.display()))
    })?;
    parse_document(&raw)
        .map_err(|reason| ProvisionError::TemplateInvalid(format!("{}: {reason}", path.display())))
}

fn parse_document(raw: &str) -> Result<ParamMap, String> {
    let map = params::parse(raw).map_err(|e| e.to_string())?;
    if map.is_empty() {
        return Err("template defines no parameters".to_string());
    }
    Ok(map)
}
