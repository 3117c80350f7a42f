//! Tenant configuration generation.
//!
//! Merges the default template, the tenant's directory record, and the
//! trusted main-database connection info into a generated parameter
//! set. Every tenant-controlled field passes a whitelist check before
//! anything is merged; a single failure aborts the whole generation so
//! no artifact is ever written from partially validated data. The
//! directory row must be treated as attacker-influenceable: it may
//! have sourced a user-submitted value upstream.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::ProvisionError;
use crate::params::{ParamMap, ParamValue};
use crate::record::TenantRecord;
use crate::secret;

/// Trusted connection info for the main database. `db_host`/`db_port`
/// in generated artifacts come from here, never from the tenant row.
#[derive(Debug, Clone)]
pub struct MainDbInfo {
    pub host: String,
    pub port: u16,
}

// ---------------------------------------------------------------------------
// Field whitelists
// ---------------------------------------------------------------------------

static DB_HOST_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9.:-]+$").expect("db host regex"));
static DB_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_]+$").expect("db name regex"));
static HOST_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9.-]+$").expect("host regex"));
static FROM_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9 .,'&()!?@_-]*$").expect("from name regex"));
static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$").expect("email regex")
});
static MAILER_DSN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^[A-Za-z][A-Za-z0-9+.-]*://[^<>'"\s]+$"#).expect("mailer dsn regex")
});

fn fail(field: &'static str, reason: impl Into<String>) -> ProvisionError {
    ProvisionError::ValidationFailed {
        field,
        reason: reason.into(),
    }
}

fn check_len(field: &'static str, value: &str, max: usize) -> Result<(), ProvisionError> {
    if value.len() > max {
        return Err(fail(field, format!("longer than {max} characters")));
    }
    Ok(())
}

fn validate_db_host(value: &str) -> Result<(), ProvisionError> {
    check_len("db_host", value, 255)?;
    if value.is_empty() || !DB_HOST_RE.is_match(value) {
        return Err(fail("db_host", "must be alphanumeric, dot, hyphen or colon"));
    }
    Ok(())
}

fn validate_db_port(port: u16) -> Result<(), ProvisionError> {
    // u16 already caps at 65535; zero is the only out-of-range value.
    if port == 0 {
        return Err(fail("db_port", "must be in 1..=65535"));
    }
    Ok(())
}

fn validate_db_name(value: &str) -> Result<(), ProvisionError> {
    check_len("db_name", value, 64)?;
    if value.is_empty() || !DB_NAME_RE.is_match(value) {
        return Err(fail("db_name", "must be alphanumeric or underscore"));
    }
    Ok(())
}

fn validate_db_user(value: &str) -> Result<(), ProvisionError> {
    check_len("db_user", value, 32)?;
    if value.is_empty() || !DB_NAME_RE.is_match(value) {
        return Err(fail("db_user", "must be alphanumeric or underscore"));
    }
    Ok(())
}

fn validate_db_password(value: &str) -> Result<(), ProvisionError> {
    check_len("db_password", value, 255)?;
    if !value.chars().all(|c| (' '..='~').contains(&c)) {
        return Err(fail("db_password", "must be printable ASCII"));
    }
    Ok(())
}

fn validate_host(value: &str) -> Result<(), ProvisionError> {
    check_len("site_url", value, 255)?;
    if value.is_empty() || !HOST_RE.is_match(value) {
        return Err(fail("site_url", "host must be alphanumeric, dot or hyphen"));
    }
    Ok(())
}

fn validate_from_name(value: &str) -> Result<(), ProvisionError> {
    check_len("mailer_from_name", value, 255)?;
    if !FROM_NAME_RE.is_match(value) {
        return Err(fail(
            "mailer_from_name",
            "contains characters outside the allowed punctuation set",
        ));
    }
    Ok(())
}

fn validate_email(field: &'static str, value: &str) -> Result<(), ProvisionError> {
    check_len(field, value, 255)?;
    if !EMAIL_RE.is_match(value) {
        return Err(fail(field, "not a valid email address"));
    }
    Ok(())
}

fn validate_mailer_dsn(value: &str) -> Result<(), ProvisionError> {
    check_len("mailer_dsn", value, 500)?;
    if !MAILER_DSN_RE.is_match(value) {
        return Err(fail(
            "mailer_dsn",
            "must be scheme://... without quotes or angle brackets",
        ));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Generation
// ---------------------------------------------------------------------------

/// Generate the parameter set for a tenant.
///
/// - With `existing` (a previously generated artifact), all of its
///   keys survive, including `secret_key` and anything added by hand;
///   only the tenant-specific keys below are overwritten.
/// - Without it, generation starts from the template defaults and a
///   fresh secret key is minted.
///
/// Validation runs before any merging, so a failure leaves nothing to
/// write.
pub fn generate(
    existing: Option<ParamMap>,
    template: &ParamMap,
    record: &TenantRecord,
    host: &str,
    main_db: &MainDbInfo,
) -> Result<ParamMap, ProvisionError> {
    validate_db_host(&main_db.host)?;
    validate_db_port(main_db.port)?;
    validate_db_name(&record.db_name)?;
    validate_db_user(&record.username)?;
    validate_db_password(&record.password)?;
    validate_host(host)?;
    validate_from_name(&record.from_name)?;
    validate_email("mailer_from_email", &record.from_email)?;
    validate_email("mailer_reply_to_email", &record.reply_to_email)?;
    validate_mailer_dsn(&record.mailer_dsn)?;

    let mut params = match existing {
        Some(mut params) => {
            // A key minted once is never replaced; minting here only
            // repairs artifacts that lost theirs.
            if !params.contains_key("secret_key") {
                params.insert("secret_key".into(), secret::mint_secret_key().into());
            }
            params
        }
        None => {
            let mut params = template.clone();
            params.insert("secret_key".into(), secret::mint_secret_key().into());
            params
        }
    };

    params.insert("db_host".into(), main_db.host.clone().into());
    params.insert("db_port".into(), ParamValue::Int(i64::from(main_db.port)));
    params.insert("db_name".into(), record.db_name.clone().into());
    params.insert("db_user".into(), record.username.clone().into());
    params.insert("db_password".into(), record.password.clone().into());
    params.insert("site_url".into(), format!("http://{host}").into());
    params.insert("mailer_from_name".into(), record.from_name.clone().into());
    params.insert("mailer_from_email".into(), record.from_email.clone().into());
    params.insert(
        "mailer_reply_to_email".into(),
        record.reply_to_email.clone().into(),
    );
    params.insert("mailer_dsn".into(), record.mailer_dsn.clone().into());

    Ok(params)
}
