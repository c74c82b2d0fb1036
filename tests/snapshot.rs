// tests/snapshot.rs

//! Snapshot tests: save/restore of the whole cache, reconnection.

mod common;

use common::{TRYTON, tryton_client};
use pypi_client::{Error, IndexClient, MemoryIndex};
use tempfile::TempDir;

#[test]
fn test_snapshot_restores_equivalent_cache() {
    let (mut client, _) = tryton_client();
    client.refresh_package_list(TRYTON).unwrap();
    client.fetch_roles("trytond").unwrap();
    client.fetch_urls("trytond", "2.4.0").unwrap();
    client.fetch_release_data("trytond", "2.4.0").unwrap();

    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("snapshot.json");
    client.save(&path).unwrap();

    let mut endpoints = Vec::new();
    let restored = IndexClient::open_with(&path, |url| {
        endpoints.push(url.to_string());
        Ok(common::tryton_catalog())
    })
    .unwrap();

    assert_eq!(endpoints, vec!["memory://pypi"]);
    assert_eq!(restored.packages(), client.packages());
    assert_eq!(restored.last_refresh(), client.last_refresh());
    assert_eq!(restored.categories(), client.categories());
    // the restored client starts without any remote calls
    assert!(restored.index().calls().is_empty());
}

#[test]
fn test_restored_client_keeps_merging() {
    let (mut client, _) = tryton_client();
    client.fetch_releases("trytond", false).unwrap();
    let json = client.dump().unwrap();

    let mut restored =
        IndexClient::load_with(&json, |_| Ok(common::tryton_catalog())).unwrap();
    assert_eq!(
        restored.fetch_releases("trytond", true).unwrap().new,
        1,
        "only the hidden release is new after restore"
    );
}

#[test]
fn test_save_overwrites_previous_snapshot() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("snapshot.json");

    let (mut client, _) = tryton_client();
    client.save(&path).unwrap();
    client.fetch_releases("proteus", false).unwrap();
    client.save(&path).unwrap();

    let restored = IndexClient::open_with(&path, |url| Ok(MemoryIndex::new(url))).unwrap();
    assert!(restored.packages().contains_key("proteus"));
}

#[test]
fn test_connection_failure_on_restore_is_returned() {
    let (client, _) = tryton_client();
    let json = client.dump().unwrap();

    let result = IndexClient::<MemoryIndex>::load_with(&json, |url| {
        Err(Error::InitError(format!("cannot reach {url}")))
    });
    assert!(matches!(result, Err(Error::InitError(_))));
}

#[test]
fn test_xmlrpc_client_reconnects_to_stored_endpoint() {
    let client = IndexClient::connect("https://test.pypi.org/pypi").unwrap();
    let json = client.dump().unwrap();

    let restored = IndexClient::load(&json).unwrap();
    assert_eq!(restored.endpoint(), "https://test.pypi.org/pypi");
    assert!(restored.packages().is_empty());
}
