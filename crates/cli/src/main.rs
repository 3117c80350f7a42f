//! Command-line entry point for tenant config provisioning.
//!
//! Mirrors the web flow but keyed by explicit tenant id instead of
//! host: `--tenant` (or the `TENANT` variable) selects one tenant,
//! and omitting both fans out over every active tenant in the
//! directory, reporting per-tenant results and exiting non-zero if
//! any of them failed.

use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use tenantgate_core::directory::{LookupKey, TenantDirectory};
use tenantgate_core::identity::TenantKey;
use tenantgate_db::config::MainDbConfig;
use tenantgate_db::repositories::tenant_repo::{LookupStrategy, TenantRepo};
use tenantgate_provision::{ArtifactLayout, ConfigArtifactStore};

#[derive(Parser)]
#[command(name = "tenantgate", version, about = "Tenant config provisioning")]
struct Cli {
    /// Tenant key to operate on. Falls back to the `TENANT` variable;
    /// when neither is set, provision/regenerate run for every active
    /// tenant in the directory.
    #[arg(long, global = true, env = "TENANT")]
    tenant: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Ensure config artifacts exist (no-op for tenants already provisioned).
    Provision,
    /// Rebuild config artifacts, preserving existing secret keys.
    Regenerate,
    /// List active tenants in the directory.
    Tenants,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tenantgate=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let db_config = MainDbConfig::from_env().context("invalid main database configuration")?;
    let pool = tenantgate_db::create_pool(&db_config)
        .await
        .context("cannot connect to the main database")?;

    let strategy = match std::env::var("TENANT_LOOKUP") {
        Ok(raw) if !raw.is_empty() => raw.parse().map_err(|e: String| anyhow::anyhow!(e))?,
        _ => LookupStrategy::default(),
    };
    let repo = TenantRepo::new(pool, strategy, db_config.query_timeout);

    let config_dir = std::env::var("CONFIG_DIR").unwrap_or_else(|_| "config".to_string());
    let layout = match std::env::var("CONFIG_TEMPLATE") {
        Ok(template) if !template.is_empty() => ArtifactLayout::with_template(config_dir, template),
        _ => ArtifactLayout::new(config_dir),
    };

    let directory: Arc<dyn TenantDirectory> = Arc::new(repo.clone());
    let store = ConfigArtifactStore::new(directory, layout, db_config.info());

    match cli.command {
        Command::Tenants => list_tenants(&repo).await,
        Command::Provision => apply(&store, &repo, cli.tenant, false).await,
        Command::Regenerate => apply(&store, &repo, cli.tenant, true).await,
    }
}

async fn list_tenants(directory: &dyn TenantDirectory) -> anyhow::Result<()> {
    let records = directory.list_active().await?;
    if records.is_empty() {
        println!("No active tenants");
        return Ok(());
    }
    for record in &records {
        println!("{}\t{}\t{}", record.tenant_id, record.url, record.db_name);
    }
    Ok(())
}

/// Run provision or regenerate for one tenant, or fan out over all
/// active tenants when none is given.
async fn apply(
    store: &ConfigArtifactStore,
    directory: &dyn TenantDirectory,
    tenant: Option<String>,
    regenerate: bool,
) -> anyhow::Result<()> {
    if let Some(raw) = tenant {
        let key = TenantKey::new(&raw)
            .with_context(|| format!("invalid tenant key '{raw}'"))?;
        let artifact = apply_one(store, &key, regenerate).await?;
        report(&key, artifact.generated, &artifact.path);
        return Ok(());
    }

    let records = directory.list_active().await?;
    if records.is_empty() {
        println!("No active tenants");
        return Ok(());
    }

    // Sequential on purpose: per-tenant output stays readable and a
    // directory outage fails the remaining tenants identically.
    let mut failed = 0usize;
    for record in &records {
        let key = match TenantKey::new(&record.tenant_id) {
            Ok(key) => key,
            Err(err) => {
                eprintln!("{}: invalid tenant key ({err})", record.tenant_id);
                failed += 1;
                continue;
            }
        };
        match apply_one(store, &key, regenerate).await {
            Ok(artifact) => report(&key, artifact.generated, &artifact.path),
            Err(err) => {
                tracing::error!(tenant = %key, error = %err, "Tenant provisioning failed");
                eprintln!("{key}: {err}");
                failed += 1;
            }
        }
    }

    if failed > 0 {
        anyhow::bail!("{failed} of {} tenants failed", records.len());
    }
    Ok(())
}

async fn apply_one(
    store: &ConfigArtifactStore,
    tenant: &TenantKey,
    regenerate: bool,
) -> Result<tenantgate_provision::ResolvedArtifact, tenantgate_core::error::ProvisionError> {
    let key = LookupKey::TenantId(tenant.as_str().to_string());
    if regenerate {
        store.regenerate(tenant, &key, None).await
    } else {
        store.resolve(tenant, &key, None).await
    }
}

fn report(tenant: &TenantKey, generated: bool, path: &std::path::Path) {
    let verb = if generated { "generated" } else { "up to date" };
    println!("{tenant}: {verb} ({})", path.display());
}
