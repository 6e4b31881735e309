//! One reconciliation pass: fetch both sets, diff, apply.

use crate::acl::AclClient;
use crate::apply::{apply_deltas, ApplyReport};
use crate::config::Config;
use crate::reconcile::reconcile;
use crate::source::SourceClient;
use anyhow::Context;
use tracing::{info, warn};

/// Per-invocation options, from the command line.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassOptions {
    /// Compute and report deltas without mutating the remote ACL.
    pub dry_run: bool,
    /// Allow an empty desired set to delete every current entry.
    pub force: bool,
}

/// Result of one reconciliation pass.
#[derive(Debug)]
pub struct PassReport {
    /// Size of the fetched desired set.
    pub desired: usize,
    /// Number of current ACL entries fetched.
    pub current: usize,
    /// Create deltas computed.
    pub creates: usize,
    /// Delete deltas computed.
    pub deletes: usize,
    /// Per-chunk apply outcomes. None when nothing was applied (no deltas,
    /// or dry run).
    pub apply: Option<ApplyReport>,
}

impl PassReport {
    /// True when the pass completed without any rejected chunk.
    pub fn is_success(&self) -> bool {
        self.apply.as_ref().map_or(true, ApplyReport::is_success)
    }
}

/// Run one reconciliation pass.
///
/// The two fetches run concurrently; either failure aborts the pass before
/// any mutation. An empty desired set against a non-empty ACL aborts unless
/// forced, so a feed outage disguised as an empty 200 body cannot wipe the
/// ACL. Apply failures do not abort: they are collected per chunk in the
/// returned report.
pub async fn run_pass(config: &Config, options: PassOptions) -> anyhow::Result<PassReport> {
    let source = SourceClient::new(config.source.clone())?;
    let acl = AclClient::new(config.acl.clone())?;

    let (desired, current) = tokio::try_join!(
        async {
            source
                .fetch_desired()
                .await
                .context("Failed to retrieve Tor exit node list")
        },
        async {
            acl.fetch_current()
                .await
                .context("Failed to retrieve current ACL entries")
        },
    )?;

    let allow_wipe = options.force || config.safety.allow_empty_desired;
    if desired.is_empty() && !current.is_empty() && !allow_wipe {
        anyhow::bail!(
            "Desired set is empty; refusing to delete all {} ACL entries (use --force to override)",
            current.len()
        );
    }

    let deltas = reconcile(&desired, &current);
    let creates = deltas.iter().filter(|d| d.is_create()).count();
    let deletes = deltas.len() - creates;

    info!(
        desired = desired.len(),
        current = current.len(),
        creates,
        deletes,
        "Reconciliation computed"
    );

    let apply = if deltas.is_empty() {
        info!("ACL already in sync, nothing to apply");
        None
    } else if options.dry_run {
        warn!(creates, deletes, "Dry run, skipping ACL update");
        None
    } else {
        Some(apply_deltas(&acl, deltas, config.batch.max_size).await)
    };

    Ok(PassReport {
        desired: desired.len(),
        current: current.len(),
        creates,
        deletes,
        apply,
    })
}
