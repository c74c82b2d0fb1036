// src/lib.rs

//! PyPI index client
//!
//! Local cache of the Python Package Index, filled through its XML-RPC
//! interface and restorable from a JSON snapshot.
//!
//! # Architecture
//!
//! - `xmlrpc`: wire codec and HTTP transport for the remote procedures
//! - `index`: the `PackageIndex` trait, backed remotely or in memory
//! - `cache`: packages, releases and release files with schema-driven merges
//! - `client`: `IndexClient`, which merges index answers into the cache
//! - `report`: pluggable sink for the client's diagnostics
//! - `config`: TOML configuration with platform default paths

pub mod cache;
pub mod client;
pub mod config;
mod error;
pub mod index;
pub mod report;
pub mod xmlrpc;

pub use cache::{Package, Release, ReleaseFile};
pub use client::{Categories, FetchSummary, IndexClient, RefreshSummary};
pub use config::Config;
pub use error::{Error, Result};
pub use index::{MemoryIndex, PackageIndex, XmlRpcIndex};
pub use report::{MemoryReporter, ReportLevel, Reporter, SilentReporter, TracingReporter};
