// src/cache/mod.rs

//! Cached index records
//!
//! - [`Package`]: releases, roles and the highest known version
//! - [`Release`]: descriptive metadata and files of one version
//! - [`ReleaseFile`]: one distribution artifact of a release
//!
//! Records are only ever added or updated in place; nothing here removes
//! data that was fetched before.

mod fields;
mod file;
mod package;
mod release;

pub use fields::{FieldSchema, FromValue, assign, merge_fields};
pub use file::ReleaseFile;
pub use package::Package;
pub use release::Release;
