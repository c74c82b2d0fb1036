// src/client/snapshot.rs

//! Snapshot persistence for [`IndexClient`]
//!
//! A snapshot is a JSON document holding the endpoint address, the package
//! cache, the last refresh timestamp and the refresh settings. The remote
//! connection is not part of it; restoring a snapshot opens a new one for
//! the stored endpoint.

use std::fs;
use std::io::Write;
use std::path::Path;
use tracing::debug;

use super::{CacheState, IndexClient};
use crate::error::{Error, Result};
use crate::index::{PackageIndex, XmlRpcIndex};

impl<I: PackageIndex> IndexClient<I> {
    /// Serialize the cache to a JSON document
    pub fn dump(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.state)?)
    }

    /// Write the snapshot to `path`, replacing any previous file
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = self.dump()?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| {
                Error::IoError(format!("Failed to create {}: {e}", parent.display()))
            })?;
        }

        // Write to temp, then rename over the previous snapshot
        let temp_path = path.with_extension("tmp");
        if let Err(e) = write_and_rename(&temp_path, path, json.as_bytes()) {
            let _ = fs::remove_file(&temp_path);
            return Err(e);
        }

        debug!(
            "Saved snapshot of {} packages to {}",
            self.state.packages.len(),
            path.display()
        );
        Ok(())
    }

    /// Restore a client from a JSON document
    ///
    /// `connect` opens the index for the endpoint stored in the snapshot.
    pub fn load_with<F>(text: &str, connect: F) -> Result<Self>
    where
        F: FnOnce(&str) -> Result<I>,
    {
        let state: CacheState = serde_json::from_str(text)?;
        if state.server_url.is_empty() {
            return Err(Error::ParseError(
                "Invalid snapshot: missing server_url".to_string(),
            ));
        }
        let index = connect(&state.server_url)?;
        Ok(Self::from_parts(index, state))
    }

    /// Restore a client from the snapshot file at `path`
    pub fn open_with<F>(path: &Path, connect: F) -> Result<Self>
    where
        F: FnOnce(&str) -> Result<I>,
    {
        let text = fs::read_to_string(path).map_err(|e| {
            Error::IoError(format!("Failed to read snapshot {}: {e}", path.display()))
        })?;
        let client = Self::load_with(&text, connect)?;
        debug!(
            "Loaded snapshot of {} packages from {}",
            client.state.packages.len(),
            path.display()
        );
        Ok(client)
    }
}

fn write_and_rename(temp_path: &Path, path: &Path, content: &[u8]) -> Result<()> {
    let mut file = fs::File::create(temp_path).map_err(|e| {
        Error::IoError(format!("Failed to create {}: {e}", temp_path.display()))
    })?;
    file.write_all(content)?;
    file.sync_all()?;
    fs::rename(temp_path, path).map_err(|e| {
        Error::IoError(format!("Failed to write snapshot {}: {e}", path.display()))
    })
}

impl IndexClient<XmlRpcIndex> {
    /// Restore a client and reconnect to its XML-RPC endpoint
    pub fn load(text: &str) -> Result<Self> {
        Self::load_with(text, XmlRpcIndex::connect)
    }

    /// Restore a client from `path` and reconnect to its XML-RPC endpoint
    pub fn open(path: &Path) -> Result<Self> {
        Self::open_with(path, XmlRpcIndex::connect)
    }
}
