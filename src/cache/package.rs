// src/cache/package.rs

//! Package records: releases, roles and the highest known release

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use super::release::Release;
use crate::error::{Error, Result};

/// A named package of the index
///
/// `last_release` is never lower than any cached version. Versions compare
/// as plain strings, so "1.10" sorts before "1.9".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Package {
    name: String,
    last_release: Option<String>,
    #[serde(default)]
    releases: BTreeMap<String, Release>,
    #[serde(default)]
    roles: BTreeMap<String, Vec<String>>,
}

impl Package {
    /// An empty package with no releases
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// A package seeded with its first known release
    pub fn with_release(name: impl Into<String>, version: &str) -> Self {
        let mut package = Self::new(name);
        package.record_release(version);
        package
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Highest known release
    pub fn last_release(&self) -> Option<&str> {
        self.last_release.as_deref()
    }

    pub fn releases(&self) -> &BTreeMap<String, Release> {
        &self.releases
    }

    pub fn release(&self, version: &str) -> Option<&Release> {
        self.releases.get(version)
    }

    /// Users holding each role
    pub fn roles(&self) -> &BTreeMap<String, Vec<String>> {
        &self.roles
    }

    /// Adopt `candidate` as last release when it is higher than the current one
    ///
    /// Returns whether `last_release` changed; an empty candidate is an error.
    pub fn bump_last_release(&mut self, candidate: &str) -> Result<bool> {
        if candidate.is_empty() {
            return Err(Error::InvalidInput(format!(
                "empty release version for package '{}'",
                self.name
            )));
        }
        Ok(self.adopt_if_newer(candidate))
    }

    fn adopt_if_newer(&mut self, candidate: &str) -> bool {
        match &self.last_release {
            Some(current) if current.as_str() >= candidate => false,
            _ => {
                self.last_release = Some(candidate.to_string());
                true
            }
        }
    }

    /// Add an empty release for `version`
    ///
    /// Returns true only the first time a version is recorded.
    pub fn record_release(&mut self, version: &str) -> bool {
        if self.releases.contains_key(version) {
            return false;
        }
        self.releases
            .insert(version.to_string(), Release::new(self.name.clone(), version));
        if !version.is_empty() {
            self.adopt_if_newer(version);
        }
        true
    }

    /// Find the cached release for `version`
    ///
    /// When it's missing and `default` is given, the default is stored and
    /// returned; its version must match the requested one. `Ok(None)` means
    /// the release isn't cached and no default was supplied.
    ///
    /// Errors are only returned; `IndexClient::lookup_release` reports them.
    pub fn lookup_release(
        &mut self,
        version: &str,
        default: Option<Release>,
    ) -> Result<Option<&mut Release>> {
        if version.is_empty() {
            return Err(Error::InvalidInput(format!(
                "empty release version for package '{}'",
                self.name
            )));
        }
        if self.releases.contains_key(version) {
            return Ok(self.releases.get_mut(version));
        }
        let Some(default) = default else {
            return Ok(None);
        };
        if default.version() != version {
            return Err(Error::VersionMismatch {
                requested: version.to_string(),
                supplied: default.version().to_string(),
            });
        }
        self.adopt_if_newer(version);
        Ok(Some(self.releases.entry(version.to_string()).or_insert(default)))
    }

    /// Add `user` to `role`; returns whether the user was new to the role
    pub fn grant_role(&mut self, role: &str, user: &str) -> bool {
        let members = self.roles.entry(role.to_string()).or_default();
        if members.iter().any(|member| member == user) {
            return false;
        }
        members.push(user.to_string());
        true
    }
}

impl fmt::Display for Package {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Package \"{}\"", self.name)?;
        writeln!(
            f,
            "    last_release=\"{}\"",
            self.last_release.as_deref().unwrap_or("")
        )?;
        let versions: Vec<&str> = self.releases.keys().map(String::as_str).collect();
        writeln!(f, "    releases=[{}]", versions.join(", "))?;
        write!(f, "    roles={{")?;
        for (i, (role, users)) in self.roles.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, " {}: [{}]", role, users.join(", "))?;
        }
        write!(f, " }}")
    }
}
