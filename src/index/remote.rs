// src/index/remote.rs

//! [`PackageIndex`] over XML-RPC

use std::time::Duration;

use super::PackageIndex;
use crate::error::{Error, Result};
use crate::xmlrpc::{self, Fields, HttpTransport, RpcTransport, Value};

/// Package index reached through an XML-RPC transport
#[derive(Debug, Clone)]
pub struct XmlRpcIndex<T = HttpTransport> {
    transport: T,
}

impl XmlRpcIndex<HttpTransport> {
    /// Connect to `url` with the default HTTP settings
    pub fn connect(url: &str) -> Result<Self> {
        Ok(Self::new(HttpTransport::new(url)?))
    }

    /// Connect to `url` with an explicit timeout and retry budget
    pub fn connect_with(url: &str, timeout: Duration, max_retries: u32) -> Result<Self> {
        Ok(Self::new(HttpTransport::with_options(url, timeout, max_retries)?))
    }
}

impl<T: RpcTransport> XmlRpcIndex<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    fn call(&self, method: &str, params: &[Value]) -> Result<Value> {
        xmlrpc::call(&self.transport, method, params)
    }
}

/// Unwrap a list result; nil counts as an empty list
fn into_list(method: &str, value: Value) -> Result<Vec<Value>> {
    match value {
        Value::Array(items) => Ok(items),
        Value::Nil => Ok(Vec::new()),
        other => Err(shape_error(method, "an array", &other)),
    }
}

fn into_fields(method: &str, value: Value) -> Result<Fields> {
    match value {
        Value::Struct(fields) => Ok(fields),
        Value::Nil => Ok(Fields::new()),
        other => Err(shape_error(method, "a struct", &other)),
    }
}

/// Split a two-element array into its members
fn into_pair(method: &str, value: Value) -> Result<(Value, Value)> {
    match value {
        Value::Array(items) if items.len() == 2 => {
            let mut items = items.into_iter();
            match (items.next(), items.next()) {
                (Some(first), Some(second)) => Ok((first, second)),
                _ => Err(Error::ParseError(format!("{method}: truncated pair"))),
            }
        }
        other => Err(shape_error(method, "a two-element array", &other)),
    }
}

fn into_string(method: &str, value: Value) -> Result<String> {
    match value {
        Value::String(s) => Ok(s),
        // browse() reports packages without releases with a nil version
        Value::Nil => Ok(String::new()),
        other => Err(shape_error(method, "a string", &other)),
    }
}

fn shape_error(method: &str, expected: &str, found: &Value) -> Error {
    Error::ParseError(format!(
        "{method}: expected {expected}, found {}",
        found.type_name()
    ))
}

impl<T: RpcTransport> PackageIndex for XmlRpcIndex<T> {
    fn endpoint(&self) -> &str {
        self.transport.endpoint()
    }

    fn browse(&self, categories: &[String]) -> Result<Vec<(String, String)>> {
        let categories = categories.iter().map(|c| Value::from(c.as_str())).collect();
        let result = self.call("browse", &[Value::Array(categories)])?;

        into_list("browse", result)?
            .into_iter()
            .map(|entry| {
                let (name, version) = into_pair("browse", entry)?;
                Ok((into_string("browse", name)?, into_string("browse", version)?))
            })
            .collect()
    }

    fn package_releases(&self, name: &str, show_hidden: bool) -> Result<Vec<String>> {
        let result = self.call(
            "package_releases",
            &[Value::from(name), Value::Bool(show_hidden)],
        )?;

        into_list("package_releases", result)?
            .into_iter()
            .map(|version| into_string("package_releases", version))
            .collect()
    }

    fn package_roles(&self, name: &str) -> Result<Vec<(String, String)>> {
        let result = self.call("package_roles", &[Value::from(name)])?;

        into_list("package_roles", result)?
            .into_iter()
            .map(|entry| {
                let (role, user) = into_pair("package_roles", entry)?;
                Ok((
                    into_string("package_roles", role)?,
                    into_string("package_roles", user)?,
                ))
            })
            .collect()
    }

    fn release_downloads(&self, name: &str, version: &str) -> Result<Vec<(String, i64)>> {
        let result = self.call(
            "release_downloads",
            &[Value::from(name), Value::from(version)],
        )?;

        into_list("release_downloads", result)?
            .into_iter()
            .map(|entry| {
                let (filename, count) = into_pair("release_downloads", entry)?;
                let count = count
                    .as_i64()
                    .ok_or_else(|| shape_error("release_downloads", "an int", &count))?;
                Ok((into_string("release_downloads", filename)?, count))
            })
            .collect()
    }

    fn release_urls(&self, name: &str, version: &str) -> Result<Vec<Fields>> {
        let result = self.call("release_urls", &[Value::from(name), Value::from(version)])?;

        into_list("release_urls", result)?
            .into_iter()
            .map(|entry| into_fields("release_urls", entry))
            .collect()
    }

    fn release_data(&self, name: &str, version: &str) -> Result<Fields> {
        let result = self.call("release_data", &[Value::from(name), Value::from(version)])?;
        into_fields("release_data", result)
    }
}
