/// Failure taxonomy for tenant resolution and config provisioning.
///
/// Every stage of a resolution maps onto exactly one of these variants
/// so callers can translate them into HTTP statuses (api crate) or
/// exit codes (cli crate) without string matching.
#[derive(Debug, thiserror::Error)]
pub enum ProvisionError {
    /// No tenant key could be derived from the request context.
    #[error("No tenant found in host")]
    IdentificationFailed,

    /// The tenant directory has no row for the lookup key.
    #[error("No tenant found for host: {0}")]
    TenantNotFound(String),

    /// The main database could not be reached or the query errored.
    /// Distinct from [`ProvisionError::TenantNotFound`]: this is
    /// retryable, a miss is not.
    #[error("Tenant directory unavailable: {0}")]
    DirectoryUnavailable(String),

    /// The default parameter template is missing or malformed.
    #[error("Invalid config template: {0}")]
    TemplateInvalid(String),

    /// A tenant-controlled field failed its whitelist check. The raw
    /// value is deliberately not carried here; it may contain injected
    /// control characters and must never reach logs or responses.
    #[error("Validation failed for '{field}': {reason}")]
    ValidationFailed {
        field: &'static str,
        reason: String,
    },

    /// The generated artifact could not be written or renamed.
    #[error("Failed to persist config artifact: {0}")]
    PersistFailed(String),
}

impl ProvisionError {
    /// `true` for failures where retrying the same request can succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ProvisionError::DirectoryUnavailable(_) | ProvisionError::PersistFailed(_)
        )
    }
}
