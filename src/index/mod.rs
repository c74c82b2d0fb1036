// src/index/mod.rs

//! Remote package index procedures
//!
//! [`PackageIndex`] is the fixed contract the cache consumes: six read-only
//! procedures of the PyPI XML-RPC API. [`XmlRpcIndex`] speaks it over HTTP,
//! [`MemoryIndex`] serves a canned catalog for offline use and tests.

mod memory;
mod remote;

pub use memory::MemoryIndex;
pub use remote::XmlRpcIndex;

use crate::error::Result;
use crate::xmlrpc::Fields;

/// Read-only view of a remote package index
pub trait PackageIndex {
    /// Address of the remote service
    fn endpoint(&self) -> &str;

    /// Packages classified under all of `categories`, as (name, version) pairs
    fn browse(&self, categories: &[String]) -> Result<Vec<(String, String)>>;

    /// Versions published for a package
    fn package_releases(&self, name: &str, show_hidden: bool) -> Result<Vec<String>>;

    /// (role, user) assignments of a package
    fn package_roles(&self, name: &str) -> Result<Vec<(String, String)>>;

    /// (filename, download count) pairs of a release
    fn release_downloads(&self, name: &str, version: &str) -> Result<Vec<(String, i64)>>;

    /// Per-file metadata of a release; every entry carries a `filename`
    fn release_urls(&self, name: &str, version: &str) -> Result<Vec<Fields>>;

    /// Descriptive metadata of a release
    fn release_data(&self, name: &str, version: &str) -> Result<Fields>;
}
