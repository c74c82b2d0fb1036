// src/index/memory.rs

//! In-memory package index

use std::cell::RefCell;
use std::collections::BTreeMap;

use super::PackageIndex;
use crate::error::Result;
use crate::xmlrpc::Fields;

#[derive(Debug, Clone, Default)]
struct CatalogEntry {
    categories: Vec<String>,
    releases: Vec<String>,
    hidden: Vec<String>,
    roles: Vec<(String, String)>,
    downloads: BTreeMap<String, Vec<(String, i64)>>,
    urls: BTreeMap<String, Vec<Fields>>,
    data: BTreeMap<String, Fields>,
}

/// Package index serving a catalog held in memory
///
/// Answers the same procedures as the remote service and records every call,
/// so a cache can be driven offline and tests can assert which procedures
/// were hit.
///
/// ```
/// use pypi_client::index::{MemoryIndex, PackageIndex};
///
/// let index = MemoryIndex::new("memory://")
///     .with_package("trytond", &["Framework :: Tryton"])
///     .with_release("trytond", "2.4.0");
///
/// let pairs = index.browse(&["Framework :: Tryton".to_string()]).unwrap();
/// assert_eq!(pairs, vec![("trytond".to_string(), "2.4.0".to_string())]);
/// ```
#[derive(Debug, Default)]
pub struct MemoryIndex {
    endpoint: String,
    catalog: BTreeMap<String, CatalogEntry>,
    calls: RefCell<Vec<String>>,
}

impl MemoryIndex {
    pub fn new(endpoint: &str) -> Self {
        Self {
            endpoint: endpoint.to_string(),
            ..Default::default()
        }
    }

    /// Register a package under `categories`
    pub fn with_package(mut self, name: &str, categories: &[&str]) -> Self {
        self.add_package(name, categories);
        self
    }

    pub fn with_release(mut self, name: &str, version: &str) -> Self {
        self.add_release(name, version);
        self
    }

    /// A release only listed when hidden releases are requested
    pub fn with_hidden_release(mut self, name: &str, version: &str) -> Self {
        self.entry(name).hidden.push(version.to_string());
        self
    }

    pub fn with_role(mut self, name: &str, role: &str, user: &str) -> Self {
        self.add_role(name, role, user);
        self
    }

    pub fn with_download(mut self, name: &str, version: &str, filename: &str, count: i64) -> Self {
        self.set_download(name, version, filename, count);
        self
    }

    /// Per-file metadata; `fields` must carry a `filename`
    pub fn with_url(mut self, name: &str, version: &str, fields: Fields) -> Self {
        self.entry(name)
            .urls
            .entry(version.to_string())
            .or_default()
            .push(fields);
        self
    }

    pub fn with_release_data(mut self, name: &str, version: &str, fields: Fields) -> Self {
        self.set_release_data(name, version, fields);
        self
    }

    pub fn add_package(&mut self, name: &str, categories: &[&str]) {
        let entry = self.entry(name);
        for category in categories {
            if !entry.categories.iter().any(|c| c == category) {
                entry.categories.push(category.to_string());
            }
        }
    }

    pub fn add_release(&mut self, name: &str, version: &str) {
        let entry = self.entry(name);
        if !entry.releases.iter().any(|v| v == version) {
            entry.releases.push(version.to_string());
        }
    }

    pub fn add_role(&mut self, name: &str, role: &str, user: &str) {
        self.entry(name)
            .roles
            .push((role.to_string(), user.to_string()));
    }

    /// Set the download count of a file, replacing any previous count
    pub fn set_download(&mut self, name: &str, version: &str, filename: &str, count: i64) {
        let files = self
            .entry(name)
            .downloads
            .entry(version.to_string())
            .or_default();
        match files.iter_mut().find(|(f, _)| f == filename) {
            Some((_, existing)) => *existing = count,
            None => files.push((filename.to_string(), count)),
        }
    }

    pub fn set_release_data(&mut self, name: &str, version: &str, fields: Fields) {
        self.entry(name).data.insert(version.to_string(), fields);
    }

    /// Procedures called so far, in order
    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    /// Number of calls made to `method`
    pub fn call_count(&self, method: &str) -> usize {
        self.calls.borrow().iter().filter(|c| *c == method).count()
    }

    fn entry(&mut self, name: &str) -> &mut CatalogEntry {
        self.catalog.entry(name.to_string()).or_default()
    }

    fn record(&self, method: &str) {
        self.calls.borrow_mut().push(method.to_string());
    }
}

impl PackageIndex for MemoryIndex {
    fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn browse(&self, categories: &[String]) -> Result<Vec<(String, String)>> {
        self.record("browse");
        let mut pairs = Vec::new();
        for (name, entry) in &self.catalog {
            if !categories.iter().all(|c| entry.categories.contains(c)) {
                continue;
            }
            for version in &entry.releases {
                pairs.push((name.clone(), version.clone()));
            }
        }
        Ok(pairs)
    }

    fn package_releases(&self, name: &str, show_hidden: bool) -> Result<Vec<String>> {
        self.record("package_releases");
        let Some(entry) = self.catalog.get(name) else {
            return Ok(Vec::new());
        };
        let mut versions = entry.releases.clone();
        if show_hidden {
            versions.extend(entry.hidden.iter().cloned());
        }
        Ok(versions)
    }

    fn package_roles(&self, name: &str) -> Result<Vec<(String, String)>> {
        self.record("package_roles");
        Ok(self
            .catalog
            .get(name)
            .map(|entry| entry.roles.clone())
            .unwrap_or_default())
    }

    fn release_downloads(&self, name: &str, version: &str) -> Result<Vec<(String, i64)>> {
        self.record("release_downloads");
        Ok(self
            .catalog
            .get(name)
            .and_then(|entry| entry.downloads.get(version))
            .cloned()
            .unwrap_or_default())
    }

    fn release_urls(&self, name: &str, version: &str) -> Result<Vec<Fields>> {
        self.record("release_urls");
        Ok(self
            .catalog
            .get(name)
            .and_then(|entry| entry.urls.get(version))
            .cloned()
            .unwrap_or_default())
    }

    fn release_data(&self, name: &str, version: &str) -> Result<Fields> {
        self.record("release_data");
        Ok(self
            .catalog
            .get(name)
            .and_then(|entry| entry.data.get(version))
            .cloned()
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_browse_requires_all_categories() {
        let index = MemoryIndex::new("memory://")
            .with_package("trytond", &["Framework :: Tryton", "Topic :: Office"])
            .with_release("trytond", "2.4.0")
            .with_package("django", &["Framework :: Django"])
            .with_release("django", "1.4");

        let both = index
            .browse(&["Framework :: Tryton".to_string(), "Topic :: Office".to_string()])
            .unwrap();
        assert_eq!(both.len(), 1);
        assert!(index.browse(&["Nothing".to_string()]).unwrap().is_empty());
        assert_eq!(index.call_count("browse"), 2);
    }

    #[test]
    fn test_hidden_releases() {
        let index = MemoryIndex::new("memory://")
            .with_release("pkg", "1.0")
            .with_hidden_release("pkg", "0.9");

        assert_eq!(index.package_releases("pkg", false).unwrap(), vec!["1.0"]);
        assert_eq!(index.package_releases("pkg", true).unwrap(), vec!["1.0", "0.9"]);
        assert!(index.package_releases("missing", true).unwrap().is_empty());
    }

    #[test]
    fn test_set_download_replaces_count() {
        let mut index = MemoryIndex::new("memory://").with_download("pkg", "1.0", "pkg.tar.gz", 3);
        index.set_download("pkg", "1.0", "pkg.tar.gz", 9);

        assert_eq!(
            index.release_downloads("pkg", "1.0").unwrap(),
            vec![("pkg.tar.gz".to_string(), 9)]
        );
    }
}
