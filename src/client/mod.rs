// src/client/mod.rs

//! Index client: remote calls merged into a local cache
//!
//! Every fetch operation follows the same steps: make sure the local record
//! exists (creating an empty one when needed), call one remote procedure,
//! then merge each returned item into the record and count what was new.
//! Data only flows from the index into the cache.
//!
//! # Example
//!
//! ```ignore
//! use pypi_client::IndexClient;
//!
//! let mut client = IndexClient::connect("https://pypi.org/pypi")?;
//! let summary = client.fetch_releases("trytond", false)?;
//! println!("{} releases, {} new", summary.found, summary.new);
//! client.save(Path::new("snapshot.json"))?;
//! ```

mod snapshot;

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::fmt;

use crate::cache::{Package, Release};
use crate::config::{Config, DEFAULT_CATEGORY, DEFAULT_STALENESS_DAYS};
use crate::error::{Error, Result};
use crate::index::{PackageIndex, XmlRpcIndex};
use crate::report::{Reporter, TracingReporter};
use crate::xmlrpc::Value;

/// Upper bound for the staleness threshold (100 years)
const MAX_STALENESS_SECS: i64 = 100 * 365 * 24 * 60 * 60;

/// Category filter for a package list refresh: one name or several
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Categories(Vec<String>);

impl Categories {
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn validate(&self) -> std::result::Result<(), String> {
        if self.0.is_empty() {
            return Err("parameter 'categories' is empty".to_string());
        }
        if self.0.iter().any(|c| c.trim().is_empty()) {
            return Err(format!(
                "parameter 'categories' contains an empty name: {:?}",
                self.0
            ));
        }
        Ok(())
    }
}

impl fmt::Display for Categories {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join(", "))
    }
}

impl From<&str> for Categories {
    fn from(category: &str) -> Self {
        Self(vec![category.to_string()])
    }
}

impl From<String> for Categories {
    fn from(category: String) -> Self {
        Self(vec![category])
    }
}

impl From<Vec<String>> for Categories {
    fn from(categories: Vec<String>) -> Self {
        Self(categories)
    }
}

impl From<&[String]> for Categories {
    fn from(categories: &[String]) -> Self {
        Self(categories.to_vec())
    }
}

impl From<Vec<&str>> for Categories {
    fn from(categories: Vec<&str>) -> Self {
        Self(categories.into_iter().map(str::to_string).collect())
    }
}

impl From<&[&str]> for Categories {
    fn from(categories: &[&str]) -> Self {
        Self(categories.iter().map(|c| c.to_string()).collect())
    }
}

/// Outcome of a package list refresh
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RefreshSummary {
    /// (name, version) pairs returned by the index
    pub found: usize,
    /// Packages seen for the first time
    pub new: usize,
    /// Known packages whose last release moved forward
    pub updated: usize,
}

/// Outcome of a listing fetch (releases, roles, downloads, URLs)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FetchSummary {
    /// Items returned by the index
    pub found: usize,
    /// Items that were not cached before
    pub new: usize,
}

/// Serializable part of the client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct CacheState {
    pub(crate) server_url: String,
    #[serde(default)]
    pub(crate) packages: BTreeMap<String, Package>,
    #[serde(default)]
    pub(crate) last_list_update: Option<DateTime<Utc>>,
    #[serde(default = "default_staleness_secs")]
    pub(crate) staleness_secs: i64,
    #[serde(default = "default_categories")]
    pub(crate) categories: Vec<String>,
}

fn default_staleness_secs() -> i64 {
    i64::from(DEFAULT_STALENESS_DAYS) * 24 * 60 * 60
}

fn default_categories() -> Vec<String> {
    vec![DEFAULT_CATEGORY.to_string()]
}

impl CacheState {
    fn new(server_url: &str) -> Self {
        Self {
            server_url: server_url.to_string(),
            packages: BTreeMap::new(),
            last_list_update: None,
            staleness_secs: default_staleness_secs(),
            categories: default_categories(),
        }
    }

    /// Cached package `name`, inserting `default` when it is missing
    ///
    /// The default's name only matters when it is about to be stored.
    fn package_or_insert(
        &mut self,
        name: &str,
        default: Package,
        reporter: &dyn Reporter,
    ) -> Result<&mut Package> {
        if name.is_empty() {
            return Err(Error::EmptyPackageName);
        }
        match self.packages.entry(name.to_string()) {
            Entry::Occupied(entry) => {
                reporter.debug(&format!(
                    "lookup_package(): package '{name}' found in local cache"
                ));
                Ok(entry.into_mut())
            }
            Entry::Vacant(_) if default.name() != name => {
                let message = format!(
                    "lookup_package(): default package '{}' doesn't match '{}'",
                    default.name(),
                    name
                );
                reporter.error(&message);
                Err(Error::InvalidInput(message))
            }
            Entry::Vacant(entry) => {
                reporter.info(&format!(
                    "lookup_package(): package '{name}' not cached, default package added"
                ));
                Ok(entry.insert(default))
            }
        }
    }

    /// Cached release `version` of `name`
    ///
    /// With a default, a missing package is created and a missing release
    /// stored. Invalid versions and mismatched defaults are reported at
    /// error level.
    fn release_lookup(
        &mut self,
        name: &str,
        version: &str,
        default: Option<Release>,
        reporter: &dyn Reporter,
    ) -> Result<Option<&mut Release>> {
        if name.is_empty() {
            return Err(Error::EmptyPackageName);
        }
        let package = match default {
            Some(_) => self.package_or_insert(name, Package::new(name), reporter)?,
            None => match self.packages.get_mut(name) {
                Some(package) => package,
                None => return Ok(None),
            },
        };

        let cached = package.release(version).is_some();
        match package.lookup_release(version, default) {
            Ok(found) => {
                if !cached && found.is_some() {
                    reporter.info(&format!(
                        "lookup_release(): release '{version}' of '{name}' not cached, default release added"
                    ));
                }
                Ok(found)
            }
            Err(e) => {
                reporter.error(&format!("lookup_release(): {e}"));
                Err(e)
            }
        }
    }

    /// Cached release `version` of `name`, creating both records when missing
    fn release_or_insert(
        &mut self,
        name: &str,
        version: &str,
        reporter: &dyn Reporter,
    ) -> Result<&mut Release> {
        self.release_lookup(name, version, Some(Release::new(name, version)), reporter)?
            .ok_or_else(|| Error::InvalidInput(format!("release '{version}' could not be stored")))
    }
}

/// Report an empty remote result and turn it into [`Error::NothingFound`]
fn nothing_found(reporter: &dyn Reporter, message: String) -> Error {
    reporter.info(&message);
    Error::NothingFound(message)
}

/// Client for a package index with a local cache
pub struct IndexClient<I: PackageIndex = XmlRpcIndex> {
    index: I,
    state: CacheState,
    reporter: Box<dyn Reporter>,
}

impl IndexClient<XmlRpcIndex> {
    /// Connect to an XML-RPC endpoint with default HTTP settings
    pub fn connect(endpoint: &str) -> Result<Self> {
        Ok(Self::new(XmlRpcIndex::connect(endpoint)?))
    }

    /// Connect using the endpoint, HTTP settings, categories and staleness of `config`
    pub fn from_config(config: &Config) -> Result<Self> {
        let index =
            XmlRpcIndex::connect_with(&config.endpoint, config.timeout(), config.max_retries)?;
        Ok(Self::new(index)
            .with_categories(config.categories.clone())
            .with_staleness(config.staleness()))
    }
}

impl<I: PackageIndex> IndexClient<I> {
    /// Fresh client with an empty cache, reporting through `tracing`
    pub fn new(index: I) -> Self {
        let state = CacheState::new(index.endpoint());
        Self::from_parts(index, state)
    }

    pub(crate) fn from_parts(index: I, state: CacheState) -> Self {
        Self {
            index,
            state,
            reporter: Box::new(TracingReporter),
        }
    }

    /// Replace the reporter
    pub fn with_reporter(mut self, reporter: impl Reporter + 'static) -> Self {
        self.reporter = Box::new(reporter);
        self
    }

    /// Set the maximum age of the package list
    pub fn with_staleness(mut self, staleness: TimeDelta) -> Self {
        self.state.staleness_secs = staleness.num_seconds().clamp(0, MAX_STALENESS_SECS);
        self
    }

    /// Set the category filter used by [`list_packages`](Self::list_packages)
    pub fn with_categories(mut self, categories: Vec<String>) -> Self {
        self.state.categories = categories;
        self
    }

    /// Address of the remote index
    pub fn endpoint(&self) -> &str {
        &self.state.server_url
    }

    pub fn index(&self) -> &I {
        &self.index
    }

    pub fn index_mut(&mut self) -> &mut I {
        &mut self.index
    }

    /// Cached packages keyed by name
    pub fn packages(&self) -> &BTreeMap<String, Package> {
        &self.state.packages
    }

    /// When the package list was last refreshed
    pub fn last_refresh(&self) -> Option<DateTime<Utc>> {
        self.state.last_list_update
    }

    pub fn staleness(&self) -> TimeDelta {
        TimeDelta::seconds(self.state.staleness_secs.clamp(0, MAX_STALENESS_SECS))
    }

    pub fn categories(&self) -> &[String] {
        &self.state.categories
    }

    /// Whether the package list needs a refresh
    pub fn is_stale(&self) -> bool {
        match self.state.last_list_update {
            None => true,
            Some(last) => Utc::now().signed_duration_since(last) > self.staleness(),
        }
    }

    /// Browse `categories` and merge the (name, version) pairs into the cache
    ///
    /// New names become packages seeded with their release; known packages
    /// record the release when it is higher than their last one.
    pub fn refresh_package_list(
        &mut self,
        categories: impl Into<Categories>,
    ) -> Result<RefreshSummary> {
        let categories = categories.into();
        if let Err(problem) = categories.validate() {
            let message = format!("refresh_package_list(): {problem}");
            self.reporter.error(&message);
            return Err(Error::InvalidInput(message));
        }

        let pairs = self.index.browse(categories.as_slice())?;
        if pairs.is_empty() {
            return Err(nothing_found(
                self.reporter.as_ref(),
                format!("No package found in categories: {categories}"),
            ));
        }

        let mut summary = RefreshSummary {
            found: pairs.len(),
            ..Default::default()
        };
        for (name, version) in &pairs {
            if name.is_empty() {
                self.reporter
                    .warn(&format!("browse(): skipping entry without a name (version '{version}')"));
                continue;
            }
            match self.state.packages.get_mut(name) {
                Some(package) => match package.bump_last_release(version) {
                    Ok(true) => {
                        package.record_release(version);
                        summary.updated += 1;
                    }
                    Ok(false) => {}
                    Err(e) => self.reporter.warn(&format!("bump_last_release(): {e}")),
                },
                None => {
                    let package = if version.is_empty() {
                        Package::new(name.as_str())
                    } else {
                        Package::with_release(name.as_str(), version)
                    };
                    self.state.packages.insert(name.clone(), package);
                    summary.new += 1;
                }
            }
        }

        self.state.last_list_update = Some(Utc::now());
        self.reporter.debug(&format!(
            "refresh_package_list(): {} found, {} new, {} updated",
            summary.found, summary.new, summary.updated
        ));
        Ok(summary)
    }

    /// All cached packages sorted by name, refreshing the list first when
    /// it is stale or `force` is set
    pub fn list_packages(&mut self, force: bool) -> Result<Vec<&Package>> {
        if force || self.is_stale() {
            let categories = Categories::from(self.state.categories.clone());
            match self.refresh_package_list(categories) {
                Ok(_) => {}
                Err(e) if e.is_nothing_found() => {}
                Err(e) => return Err(e),
            }
        }
        Ok(self.state.packages.values().collect())
    }

    /// Cached package `name`
    ///
    /// When it's missing and `default` is given, the default is stored and
    /// returned. `Ok(None)` means it isn't cached and no default was given.
    /// An empty name is a caller error.
    pub fn lookup_package(
        &mut self,
        name: &str,
        default: Option<Package>,
    ) -> Result<Option<&mut Package>> {
        if let Some(default) = default {
            return self
                .state
                .package_or_insert(name, default, self.reporter.as_ref())
                .map(Some);
        }
        if name.is_empty() {
            return Err(Error::EmptyPackageName);
        }
        let found = self.state.packages.get_mut(name);
        if found.is_some() {
            self.reporter.debug(&format!(
                "lookup_package(): package '{name}' found in local cache"
            ));
        } else {
            self.reporter.debug(&format!(
                "lookup_package(): package '{name}' not cached and no default supplied"
            ));
        }
        Ok(found)
    }

    /// Cached release `version` of package `name`
    ///
    /// When it's missing and `default` is given, the package is created if
    /// needed and the default stored; the default must be for `version`.
    /// `Ok(None)` means it isn't cached and no default was given.
    pub fn lookup_release(
        &mut self,
        name: &str,
        version: &str,
        default: Option<Release>,
    ) -> Result<Option<&mut Release>> {
        self.state
            .release_lookup(name, version, default, self.reporter.as_ref())
    }

    /// Cached package `name`; with `nofetch`, a missing package is `None`
    ///
    /// Fetching a single package from the index isn't supported by the
    /// remote interface, so a missing package without `nofetch` is an
    /// [`Error::Unsupported`].
    pub fn fetch_package(&mut self, name: &str, nofetch: bool) -> Result<Option<&Package>> {
        if name.is_empty() {
            return Err(Error::EmptyPackageName);
        }
        if !nofetch && !self.state.packages.contains_key(name) {
            let message = format!("fetching package '{name}' from the index");
            self.reporter
                .warn(&format!("fetch_package(): {message} is not supported"));
            return Err(Error::Unsupported(message));
        }
        Ok(self.lookup_package(name, None)?.map(|package| &*package))
    }

    /// Fetch the versions of `name` and record each as a release
    pub fn fetch_releases(&mut self, name: &str, show_hidden: bool) -> Result<FetchSummary> {
        let reporter = self.reporter.as_ref();
        let package = self
            .state
            .package_or_insert(name, Package::new(name), reporter)?;

        let versions = self.index.package_releases(name, show_hidden)?;
        if versions.is_empty() {
            return Err(nothing_found(
                reporter,
                format!("No release found for package '{name}'"),
            ));
        }

        let mut new = 0;
        for version in &versions {
            if version.is_empty() {
                reporter.warn(&format!("package_releases(): empty version for '{name}'"));
                continue;
            }
            if package.record_release(version) {
                new += 1;
            }
        }
        Ok(FetchSummary {
            found: versions.len(),
            new,
        })
    }

    /// Fetch the role assignments of `name`
    pub fn fetch_roles(&mut self, name: &str) -> Result<FetchSummary> {
        let reporter = self.reporter.as_ref();
        let package = self
            .state
            .package_or_insert(name, Package::new(name), reporter)?;

        let roles = self.index.package_roles(name)?;
        if roles.is_empty() {
            return Err(nothing_found(
                reporter,
                format!("No role found for package '{name}'"),
            ));
        }

        let new = roles
            .iter()
            .filter(|(role, user)| package.grant_role(role, user))
            .count();
        Ok(FetchSummary {
            found: roles.len(),
            new,
        })
    }

    /// Fetch the per-file download counts of a release
    pub fn fetch_downloads(&mut self, name: &str, version: &str) -> Result<FetchSummary> {
        let reporter = self.reporter.as_ref();
        let release = self.state.release_or_insert(name, version, reporter)?;

        let downloads = self.index.release_downloads(name, version)?;
        if downloads.is_empty() {
            return Err(nothing_found(
                reporter,
                format!("No download found for release '{version}' of package '{name}'"),
            ));
        }

        let new = downloads
            .iter()
            .filter(|(filename, count)| release.record_download(filename, *count))
            .count();
        Ok(FetchSummary {
            found: downloads.len(),
            new,
        })
    }

    /// Fetch the per-file metadata of a release
    pub fn fetch_urls(&mut self, name: &str, version: &str) -> Result<FetchSummary> {
        let reporter = self.reporter.as_ref();
        let release = self.state.release_or_insert(name, version, reporter)?;

        let entries = self.index.release_urls(name, version)?;
        if entries.is_empty() {
            return Err(nothing_found(
                reporter,
                format!("No URL found for release '{version}' of package '{name}'"),
            ));
        }

        let mut new = 0;
        for entry in &entries {
            match entry.get("filename").and_then(Value::as_str) {
                Some(filename) if !filename.is_empty() => {
                    if release.record_url(filename, entry, reporter) {
                        new += 1;
                    }
                }
                _ => reporter.warn(&format!(
                    "release_urls(): entry without filename for '{name}' {version}"
                )),
            }
        }
        Ok(FetchSummary {
            found: entries.len(),
            new,
        })
    }

    /// Fetch the descriptive metadata of a release; returns whether anything changed
    pub fn fetch_release_data(&mut self, name: &str, version: &str) -> Result<bool> {
        let reporter = self.reporter.as_ref();
        let release = self.state.release_or_insert(name, version, reporter)?;

        let data = self.index.release_data(name, version)?;
        if data.is_empty() {
            return Err(nothing_found(
                reporter,
                format!("No data found for release '{version}' of package '{name}'"),
            ));
        }
        Ok(release.merge_fields(&data, reporter))
    }
}

impl<I: PackageIndex> fmt::Display for IndexClient<I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "IndexClient \"{}\"", self.state.server_url)?;
        writeln!(f, "    packages={}", self.state.packages.len())?;
        match self.state.last_list_update {
            Some(when) => writeln!(f, "    last_list_update=\"{}\"", when.to_rfc3339())?,
            None => writeln!(f, "    last_list_update=never")?,
        }
        writeln!(f, "    categories=[{}]", self.state.categories.join(", "))?;
        write!(f, "    staleness={}s", self.state.staleness_secs)
    }
}

impl<I: PackageIndex + fmt::Debug> fmt::Debug for IndexClient<I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IndexClient")
            .field("index", &self.index)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}
