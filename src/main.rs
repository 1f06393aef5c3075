use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use emr_core::config::{metadata_dir_from_env_value, reconcile_policy_from_env_value};
use emr_core::constants::{METADATA_DIR_ENV, RECONCILE_POLICY_ENV};
use emr_core::{CoreConfig, MetadataError, MetadataService, ReconcileReport};

fn log_failures(report: &ReconcileReport) {
    for failure in &report.failures {
        tracing::error!("{} {}: {}", failure.kind, failure.key, failure.reason);
    }
}

/// Startup install phase for the EMR
///
/// Installs the common metadata catalogue into the configured store and exits. Meant to run once
/// before the application starts; running it again is harmless.
///
/// # Environment Variables
/// - `EMR_METADATA_DIR`: Directory of the metadata store (default: "metadata_store")
/// - `EMR_RECONCILE_POLICY`: `install-once` or `sync` (default: "install-once")
///
/// # Returns
/// * `Ok(())` - If every descriptor was created, updated or already present
/// * `Err(anyhow::Error)` - If configuration is invalid, the store is unavailable, or any
///   descriptor failed
fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive("emr=info".parse()?))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let metadata_dir = metadata_dir_from_env_value(std::env::var(METADATA_DIR_ENV).ok());
    let policy = reconcile_policy_from_env_value(std::env::var(RECONCILE_POLICY_ENV).ok())?;
    let cfg = Arc::new(CoreConfig::new(metadata_dir, policy)?);

    tracing::info!(
        "++ Installing common metadata into {} ({})",
        cfg.metadata_dir().display(),
        cfg.policy()
    );

    let report = match MetadataService::new(cfg).install_common_metadata() {
        Ok(report) => report,
        Err(MetadataError::StoreUnavailable {
            key,
            source,
            report,
        }) => {
            log_failures(&report);
            anyhow::bail!("store became unavailable at {key} after {report}: {source}");
        }
        Err(e) => return Err(e.into()),
    };

    log_failures(&report);
    if !report.is_clean() {
        anyhow::bail!("metadata install finished with failures: {report}");
    }

    tracing::info!("++ Metadata install complete: {report}");
    Ok(())
}
