// src/cache/file.rs

//! Distribution file records (one per uploaded artifact of a release)

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::fields::{FieldSchema, assign, merge_fields};
use crate::report::Reporter;
use crate::xmlrpc::{Fields, Value};

/// Metadata and download count of one file of a release
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReleaseFile {
    pub filename: String,
    pub url: String,
    pub md5_digest: String,
    pub has_sig: bool,
    pub size: i64,
    pub upload_time: Option<NaiveDateTime>,
    pub downloads: i64,
    pub packagetype: String,
    pub python_version: String,
    pub comment_text: String,
}

impl ReleaseFile {
    pub fn new(filename: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            ..Default::default()
        }
    }

    /// A file first seen through a download listing
    pub fn with_downloads(filename: impl Into<String>, downloads: i64) -> Self {
        Self {
            downloads,
            ..Self::new(filename)
        }
    }

    /// Merge a `release_urls` entry; returns whether anything changed
    pub fn merge_fields(&mut self, values: &Fields, reporter: &dyn Reporter) -> bool {
        merge_fields(self, values, reporter)
    }
}

impl FieldSchema for ReleaseFile {
    const IDENTITY: &'static [&'static str] = &["filename"];

    fn assign(&mut self, name: &str, value: &Value) -> Option<bool> {
        match name {
            "url" => assign(&mut self.url, value),
            "md5_digest" => assign(&mut self.md5_digest, value),
            "has_sig" => assign(&mut self.has_sig, value),
            "size" => assign(&mut self.size, value),
            "upload_time" => assign(&mut self.upload_time, value),
            "downloads" => assign(&mut self.downloads, value),
            "packagetype" => assign(&mut self.packagetype, value),
            "python_version" => assign(&mut self.python_version, value),
            "comment_text" => assign(&mut self.comment_text, value),
            _ => None,
        }
    }
}

impl fmt::Display for ReleaseFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "ReleaseFile \"{}\"", self.filename)?;
        writeln!(f, "    url=\"{}\"", self.url)?;
        writeln!(f, "    md5_digest=\"{}\"", self.md5_digest)?;
        writeln!(f, "    has_sig={}", self.has_sig)?;
        writeln!(f, "    size={}", self.size)?;
        match &self.upload_time {
            Some(time) => writeln!(f, "    upload_time=\"{time}\"")?,
            None => writeln!(f, "    upload_time=none")?,
        }
        writeln!(f, "    downloads={}", self.downloads)?;
        writeln!(f, "    packagetype=\"{}\"", self.packagetype)?;
        writeln!(f, "    python_version=\"{}\"", self.python_version)?;
        write!(f, "    comment_text=\"{}\"", self.comment_text)
    }
}
