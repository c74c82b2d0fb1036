// src/commands/mod.rs
//! Command handlers for the pypi-client CLI
//!
//! Every handler runs against a [`Session`]: the client restored from the
//! snapshot (or a fresh one), saved back once the command succeeds.

mod fetch;
mod list;
mod show;

pub use fetch::{cmd_downloads, cmd_release_data, cmd_releases, cmd_roles, cmd_urls};
pub use list::{cmd_list, cmd_refresh};
pub use show::cmd_show;

use anyhow::{Context, Result};
use pypi_client::{Config, IndexClient, XmlRpcIndex};
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// Client plus the snapshot it was restored from
pub struct Session {
    pub client: IndexClient,
    snapshot: Option<PathBuf>,
}

impl Session {
    /// Restore the client from `config`'s snapshot, or start with an empty cache
    ///
    /// A snapshot taken against another endpoint than `config.endpoint` is
    /// neither reused nor overwritten: the session runs on an empty cache
    /// and isn't saved.
    pub fn open(config: &Config) -> Result<Self> {
        let Some(path) = config.snapshot_path() else {
            warn!("No cache directory available, the cache won't be saved");
            return Ok(Self {
                client: IndexClient::from_config(config)?,
                snapshot: None,
            });
        };

        if !path.exists() {
            debug!("No snapshot at {}, starting with an empty cache", path.display());
            return Ok(Self {
                client: IndexClient::from_config(config)?,
                snapshot: Some(path),
            });
        }

        let client = IndexClient::open_with(&path, |url| {
            XmlRpcIndex::connect_with(url, config.timeout(), config.max_retries)
        })
        .with_context(|| format!("Failed to restore snapshot {}", path.display()))?;

        if client.endpoint() != config.endpoint {
            warn!(
                "Snapshot {} was taken against {}; using an empty cache for {} that won't be saved \
                 (pass --snapshot to keep a separate cache)",
                path.display(),
                client.endpoint(),
                config.endpoint
            );
            return Ok(Self {
                client: IndexClient::from_config(config)?,
                snapshot: None,
            });
        }

        info!(
            "Restored {} cached packages from {}",
            client.packages().len(),
            path.display()
        );
        let client = client
            .with_categories(config.categories.clone())
            .with_staleness(config.staleness());
        Ok(Self {
            client,
            snapshot: Some(path),
        })
    }

    /// Write the cache back to the snapshot file
    pub fn save(&self) -> Result<()> {
        let Some(path) = self.snapshot.as_deref() else {
            return Ok(());
        };
        self.client
            .save(path)
            .with_context(|| format!("Failed to save snapshot {}", path.display()))?;
        debug!("Snapshot saved to {}", path.display());
        Ok(())
    }
}

/// Unwrap a client result, printing empty remote answers instead of failing
fn found<T>(result: pypi_client::Result<T>) -> Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(e) if e.is_nothing_found() => {
            println!("{}", e);
            Ok(None)
        }
        Err(e) => Err(e.into()),
    }
}
