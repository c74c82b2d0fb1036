// src/cache/release.rs

//! Release records: per-version metadata and the files of that version

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use super::fields::{FieldSchema, assign, merge_fields};
use super::file::ReleaseFile;
use crate::report::Reporter;
use crate::xmlrpc::{Fields, Value};

/// One version of a package
///
/// The package name and version are fixed at construction; descriptive
/// fields follow `release_data`, files follow `release_urls` and
/// `release_downloads`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Release {
    name: String,
    version: String,
    pub author: String,
    pub author_email: String,
    pub package_url: String,
    pub release_url: String,
    pub home_page: String,
    pub download_url: String,
    pub docs_url: String,
    pub bugtrack_url: String,
    pub summary: String,
    pub classifiers: Vec<String>,
    pub description: String,
    pub keywords: Option<String>,
    pub license: String,
    pub stable_version: Option<String>,
    pub maintainer: String,
    pub maintainer_email: String,
    pub platform: String,
    pub requires_python: Option<String>,
    #[serde(default)]
    urls: BTreeMap<String, ReleaseFile>,
}

impl Release {
    pub fn new(package: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: package.into(),
            version: version.into(),
            ..Default::default()
        }
    }

    /// Name of the package this release belongs to
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// Files of this release keyed by filename
    pub fn files(&self) -> &BTreeMap<String, ReleaseFile> {
        &self.urls
    }

    pub fn file(&self, filename: &str) -> Option<&ReleaseFile> {
        self.urls.get(filename)
    }

    /// Merge a `release_data` struct; returns whether anything changed
    pub fn merge_fields(&mut self, values: &Fields, reporter: &dyn Reporter) -> bool {
        merge_fields(self, values, reporter)
    }

    /// Merge a `release_urls` entry into the file called `filename`
    ///
    /// Returns whether the file was new to this release.
    pub fn record_url(&mut self, filename: &str, values: &Fields, reporter: &dyn Reporter) -> bool {
        let new = !self.urls.contains_key(filename);
        self.urls
            .entry(filename.to_string())
            .or_insert_with(|| ReleaseFile::new(filename))
            .merge_fields(values, reporter);
        new
    }

    /// Store the download count of `filename`
    ///
    /// Returns whether the file was new to this release. Known files get
    /// their count overwritten unconditionally.
    pub fn record_download(&mut self, filename: &str, downloads: i64) -> bool {
        match self.urls.get_mut(filename) {
            Some(file) => {
                file.downloads = downloads;
                false
            }
            None => {
                self.urls.insert(
                    filename.to_string(),
                    ReleaseFile::with_downloads(filename, downloads),
                );
                true
            }
        }
    }
}

impl FieldSchema for Release {
    // `urls` is fed through record_url/record_download only
    const IDENTITY: &'static [&'static str] = &["name", "version", "urls"];

    fn assign(&mut self, name: &str, value: &Value) -> Option<bool> {
        match name {
            "author" => assign(&mut self.author, value),
            "author_email" => assign(&mut self.author_email, value),
            "package_url" => assign(&mut self.package_url, value),
            "release_url" => assign(&mut self.release_url, value),
            "home_page" => assign(&mut self.home_page, value),
            "download_url" => assign(&mut self.download_url, value),
            "docs_url" => assign(&mut self.docs_url, value),
            "bugtrack_url" => assign(&mut self.bugtrack_url, value),
            "summary" => assign(&mut self.summary, value),
            "classifiers" => assign(&mut self.classifiers, value),
            "description" => assign(&mut self.description, value),
            "keywords" => assign(&mut self.keywords, value),
            "license" => assign(&mut self.license, value),
            "stable_version" => assign(&mut self.stable_version, value),
            "maintainer" => assign(&mut self.maintainer, value),
            "maintainer_email" => assign(&mut self.maintainer_email, value),
            "platform" => assign(&mut self.platform, value),
            "requires_python" => assign(&mut self.requires_python, value),
            _ => None,
        }
    }
}

impl fmt::Display for Release {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Release \"{} {}\"", self.name, self.version)?;
        writeln!(f, "    author=\"{}\"", self.author)?;
        writeln!(f, "    author_email=\"{}\"", self.author_email)?;
        writeln!(f, "    package_url=\"{}\"", self.package_url)?;
        writeln!(f, "    release_url=\"{}\"", self.release_url)?;
        writeln!(f, "    home_page=\"{}\"", self.home_page)?;
        writeln!(f, "    download_url=\"{}\"", self.download_url)?;
        writeln!(f, "    docs_url=\"{}\"", self.docs_url)?;
        writeln!(f, "    bugtrack_url=\"{}\"", self.bugtrack_url)?;
        writeln!(f, "    summary=\"{}\"", self.summary)?;
        writeln!(f, "    classifiers=[{}]", self.classifiers.join(", "))?;
        writeln!(f, "    keywords=\"{}\"", self.keywords.as_deref().unwrap_or(""))?;
        writeln!(f, "    license=\"{}\"", self.license)?;
        writeln!(
            f,
            "    stable_version=\"{}\"",
            self.stable_version.as_deref().unwrap_or("")
        )?;
        writeln!(f, "    maintainer=\"{}\"", self.maintainer)?;
        writeln!(f, "    maintainer_email=\"{}\"", self.maintainer_email)?;
        writeln!(f, "    platform=\"{}\"", self.platform)?;
        writeln!(
            f,
            "    requires_python=\"{}\"",
            self.requires_python.as_deref().unwrap_or("")
        )?;
        let files: Vec<&str> = self.urls.keys().map(String::as_str).collect();
        write!(f, "    files=[{}]", files.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::SilentReporter;
    use crate::xmlrpc::fields;

    #[test]
    fn test_record_download_overwrites_existing_count() {
        let mut release = Release::new("pkg", "1.0");

        assert!(release.record_download("pkg-1.0.tar.gz", 5));
        assert!(!release.record_download("pkg-1.0.tar.gz", 5));
        assert!(!release.record_download("pkg-1.0.tar.gz", 8));
        assert_eq!(release.file("pkg-1.0.tar.gz").unwrap().downloads, 8);
        assert_eq!(release.files().len(), 1);
    }

    #[test]
    fn test_record_url_reports_new_files_once() {
        let mut release = Release::new("pkg", "1.0");
        let values = fields([
            ("filename", Value::from("pkg-1.0.tar.gz")),
            ("url", Value::from("https://files.example/pkg-1.0.tar.gz")),
        ]);

        assert!(release.record_url("pkg-1.0.tar.gz", &values, &SilentReporter));
        assert!(!release.record_url("pkg-1.0.tar.gz", &values, &SilentReporter));
        assert_eq!(
            release.file("pkg-1.0.tar.gz").unwrap().url,
            "https://files.example/pkg-1.0.tar.gz"
        );
    }

    #[test]
    fn test_record_url_keeps_download_count() {
        let mut release = Release::new("pkg", "1.0");
        release.record_download("pkg-1.0.tar.gz", 42);

        let values = fields([("packagetype", Value::from("sdist"))]);
        assert!(!release.record_url("pkg-1.0.tar.gz", &values, &SilentReporter));

        let file = release.file("pkg-1.0.tar.gz").unwrap();
        assert_eq!(file.downloads, 42);
        assert_eq!(file.packagetype, "sdist");
    }

    #[test]
    fn test_merge_fields_keeps_identity() {
        let mut release = Release::new("pkg", "1.0");
        let values = fields([
            ("name", Value::from("other")),
            ("version", Value::from("2.0")),
            ("summary", Value::from("A package")),
            ("classifiers", Value::Array(vec![Value::from("Framework :: Tryton")])),
            ("stable_version", Value::Nil),
            ("_pypi_hidden", Value::Bool(false)),
        ]);

        assert!(release.merge_fields(&values, &SilentReporter));
        assert_eq!(release.name(), "pkg");
        assert_eq!(release.version(), "1.0");
        assert_eq!(release.summary, "A package");
        assert_eq!(release.classifiers, vec!["Framework :: Tryton"]);
        assert!(!release.merge_fields(&values, &SilentReporter));
    }
}
