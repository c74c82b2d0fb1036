// tests/common/mod.rs

//! Shared test utilities and helpers for integration tests.

#![allow(dead_code)]

use pypi_client::xmlrpc::{Fields, RpcTransport, Value, fields};
use pypi_client::{IndexClient, MemoryIndex, MemoryReporter, Result};
use std::cell::RefCell;
use std::collections::HashMap;

pub const TRYTON: &str = "Framework :: Tryton";

/// Catalog with two Tryton packages and one unrelated package.
///
/// trytond has releases 2.2.0 and 2.4.0 with roles, downloads, files and
/// metadata for 2.4.0; proteus has 2.4.0; django lives in another category.
pub fn tryton_catalog() -> MemoryIndex {
    MemoryIndex::new("memory://pypi")
        .with_package("trytond", &[TRYTON])
        .with_release("trytond", "2.2.0")
        .with_release("trytond", "2.4.0")
        .with_hidden_release("trytond", "1.8.0")
        .with_role("trytond", "Owner", "ced")
        .with_role("trytond", "Maintainer", "udono")
        .with_download("trytond", "2.4.0", "trytond-2.4.0.tar.gz", 1520)
        .with_url("trytond", "2.4.0", sdist_fields("trytond", "2.4.0"))
        .with_release_data("trytond", "2.4.0", release_data_fields("trytond", "2.4.0"))
        .with_package("proteus", &[TRYTON])
        .with_release("proteus", "2.4.0")
        .with_package("django", &["Framework :: Django"])
        .with_release("django", "1.4")
}

/// `release_urls` entry for the source distribution of a release
pub fn sdist_fields(name: &str, version: &str) -> Fields {
    let filename = format!("{name}-{version}.tar.gz");
    fields([
        ("url", Value::from(format!("https://files.example/{filename}"))),
        ("filename", Value::from(filename)),
        ("md5_digest", Value::from("2f6b4bd3a5b3a7f4c0e1d2c3b4a59687")),
        ("has_sig", Value::Bool(false)),
        ("size", Value::Int(873_412)),
        ("packagetype", Value::from("sdist")),
        ("python_version", Value::from("source")),
        ("downloads", Value::Int(1520)),
    ])
}

/// `release_data` struct of a release
pub fn release_data_fields(name: &str, version: &str) -> Fields {
    fields([
        ("name", Value::from(name)),
        ("version", Value::from(version)),
        ("summary", Value::from("Tryton server")),
        ("author", Value::from("B2CK")),
        ("license", Value::from("GPL-3")),
        ("home_page", Value::from("http://www.tryton.org/")),
        (
            "classifiers",
            Value::Array(vec![
                Value::from(TRYTON),
                Value::from("License :: OSI Approved :: GNU General Public License (GPL)"),
            ]),
        ),
        ("_pypi_hidden", Value::Bool(false)),
    ])
}

/// Client over [`tryton_catalog`] with a reporter kept for inspection
pub fn tryton_client() -> (IndexClient<MemoryIndex>, MemoryReporter) {
    let reporter = MemoryReporter::new();
    let client = IndexClient::new(tryton_catalog()).with_reporter(reporter.clone());
    (client, reporter)
}

/// Transport answering each procedure with a fixed XML document.
pub struct CannedTransport {
    responses: HashMap<String, String>,
    requests: RefCell<Vec<String>>,
}

impl CannedTransport {
    pub fn new() -> Self {
        Self {
            responses: HashMap::new(),
            requests: RefCell::new(Vec::new()),
        }
    }

    /// Answer `method` with `<methodResponse>` holding `value_xml`
    pub fn respond(mut self, method: &str, value_xml: &str) -> Self {
        self.responses.insert(
            method.to_string(),
            format!(
                "<?xml version='1.0'?>\n<methodResponse><params><param>{value_xml}</param></params></methodResponse>"
            ),
        );
        self
    }

    /// Answer `method` with a fault
    pub fn fault(mut self, method: &str, code: i64, message: &str) -> Self {
        self.responses.insert(
            method.to_string(),
            format!(
                "<methodResponse><fault><value><struct>\
                 <member><name>faultCode</name><value><int>{code}</int></value></member>\
                 <member><name>faultString</name><value><string>{message}</string></value></member>\
                 </struct></value></fault></methodResponse>"
            ),
        );
        self
    }

    /// Request bodies posted so far
    pub fn requests(&self) -> Vec<String> {
        self.requests.borrow().clone()
    }
}

impl RpcTransport for CannedTransport {
    fn endpoint(&self) -> &str {
        "canned://pypi"
    }

    fn post(&self, body: &str) -> Result<String> {
        self.requests.borrow_mut().push(body.to_string());
        let method = body
            .split("<methodName>")
            .nth(1)
            .and_then(|rest| rest.split("</methodName>").next())
            .unwrap_or_default();
        Ok(self.responses.get(method).cloned().unwrap_or_else(|| {
            "<methodResponse><params><param><value><array><data/></array></value></param></params></methodResponse>"
                .to_string()
        }))
    }
}
