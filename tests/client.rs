// tests/client.rs

//! Client workflow tests: package list refresh, fetch-and-merge operations,
//! reporting of caller mistakes and empty results.

mod common;

use chrono::{TimeDelta, Utc};
use common::{TRYTON, tryton_catalog, tryton_client};
use pypi_client::{Error, FetchSummary, IndexClient, RefreshSummary, ReportLevel};

#[test]
fn test_list_packages_refreshes_once_then_serves_cache() {
    let (mut client, _) = tryton_client();
    assert!(client.is_stale());

    let names: Vec<String> = client
        .list_packages(false)
        .unwrap()
        .into_iter()
        .map(|p| p.name().to_string())
        .collect();
    assert_eq!(names, vec!["proteus", "trytond"]);
    assert!(!client.is_stale());

    client.list_packages(false).unwrap();
    assert_eq!(client.index().call_count("browse"), 1);
}

#[test]
fn test_zero_staleness_refreshes_every_time() {
    let mut client = IndexClient::new(tryton_catalog()).with_staleness(TimeDelta::zero());

    client.list_packages(false).unwrap();
    // elapsed time must exceed the threshold
    std::thread::sleep(std::time::Duration::from_millis(5));
    client.list_packages(false).unwrap();
    assert_eq!(client.index().call_count("browse"), 2);
}

#[test]
fn test_negative_staleness_is_clamped() {
    let client = IndexClient::new(tryton_catalog()).with_staleness(TimeDelta::days(-2));
    assert_eq!(client.staleness(), TimeDelta::zero());
}

#[test]
fn test_refresh_with_several_categories() {
    let (mut client, _) = tryton_client();
    client
        .index_mut()
        .add_package("proteus", &["Topic :: Office/Business"]);

    let summary = client
        .refresh_package_list(vec![TRYTON, "Topic :: Office/Business"])
        .unwrap();
    assert_eq!(summary, RefreshSummary { found: 1, new: 1, updated: 0 });
    assert!(client.packages().contains_key("proteus"));
    assert!(!client.packages().contains_key("trytond"));
}

#[test]
fn test_refresh_failure_keeps_previous_timestamp() {
    let (mut client, _) = tryton_client();
    client.refresh_package_list(TRYTON).unwrap();
    let refreshed = client.last_refresh();

    let empty: Vec<String> = Vec::new();
    assert!(client.refresh_package_list(empty).is_err());
    assert!(
        client
            .refresh_package_list("Framework :: Zope")
            .unwrap_err()
            .is_nothing_found()
    );
    assert_eq!(client.last_refresh(), refreshed);
    assert_eq!(client.packages().len(), 2);
}

#[test]
fn test_last_release_never_decreases() {
    let (mut client, _) = tryton_client();
    client.fetch_releases("trytond", true).unwrap();

    let package = &client.packages()["trytond"];
    assert_eq!(package.releases().len(), 3);
    assert_eq!(package.last_release(), Some("2.4.0"));
    for version in package.releases().keys() {
        assert!(version.as_str() <= package.last_release().unwrap());
    }
}

#[test]
fn test_full_release_workflow() {
    let (mut client, reporter) = tryton_client();

    assert_eq!(
        client.fetch_releases("trytond", false).unwrap(),
        FetchSummary { found: 2, new: 2 }
    );
    assert_eq!(
        client.fetch_roles("trytond").unwrap(),
        FetchSummary { found: 2, new: 2 }
    );
    assert_eq!(
        client.fetch_urls("trytond", "2.4.0").unwrap(),
        FetchSummary { found: 1, new: 1 }
    );
    // the file is already known from its URL entry
    assert_eq!(
        client.fetch_downloads("trytond", "2.4.0").unwrap(),
        FetchSummary { found: 1, new: 0 }
    );
    assert!(client.fetch_release_data("trytond", "2.4.0").unwrap());

    let release = client.packages()["trytond"].release("2.4.0").unwrap();
    assert_eq!(release.name(), "trytond");
    assert_eq!(release.version(), "2.4.0");
    assert_eq!(release.author, "B2CK");
    assert_eq!(release.classifiers.len(), 2);

    let file = release.file("trytond-2.4.0.tar.gz").unwrap();
    assert_eq!(file.packagetype, "sdist");
    assert_eq!(file.size, 873_412);
    assert_eq!(file.downloads, 1520);

    assert!(reporter.at(ReportLevel::Error).is_empty());
    assert!(reporter.at(ReportLevel::Warn).is_empty());
}

#[test]
fn test_repeated_fetches_are_idempotent() {
    let (mut client, _) = tryton_client();
    client.fetch_urls("trytond", "2.4.0").unwrap();
    client.fetch_release_data("trytond", "2.4.0").unwrap();
    let before = client.packages().clone();

    assert_eq!(
        client.fetch_urls("trytond", "2.4.0").unwrap(),
        FetchSummary { found: 1, new: 0 }
    );
    assert!(!client.fetch_release_data("trytond", "2.4.0").unwrap());
    assert_eq!(client.packages(), &before);
}

#[test]
fn test_empty_results_are_reported_at_info() {
    let (mut client, reporter) = tryton_client();

    assert!(matches!(client.fetch_roles("proteus"), Err(Error::NothingFound(_))));
    assert!(matches!(
        client.fetch_downloads("proteus", "2.4.0"),
        Err(Error::NothingFound(_))
    ));
    assert!(matches!(
        client.fetch_urls("proteus", "2.4.0"),
        Err(Error::NothingFound(_))
    ));

    let infos = reporter.at(ReportLevel::Info);
    assert!(infos.iter().any(|m| m.contains("No role found")));
    assert!(infos.iter().any(|m| m.contains("No download found")));
    assert!(infos.iter().any(|m| m.contains("No URL found")));
    assert!(reporter.at(ReportLevel::Error).is_empty());

    // records created on the way stay cached
    assert!(client.packages()["proteus"].release("2.4.0").is_some());
}

#[test]
fn test_caller_mistakes_are_reported_as_errors() {
    let (mut client, reporter) = tryton_client();

    assert!(matches!(client.fetch_releases("", false), Err(Error::EmptyPackageName)));
    assert!(matches!(
        client.fetch_release_data("trytond", ""),
        Err(Error::InvalidInput(_))
    ));
    assert_eq!(reporter.at(ReportLevel::Error).len(), 1);
    assert_eq!(client.index().calls().len(), 0);
}

#[test]
fn test_fetch_package_serves_cache_only() {
    let (mut client, _) = tryton_client();
    client.fetch_releases("proteus", false).unwrap();

    let package = client.fetch_package("proteus", false).unwrap().unwrap();
    assert_eq!(package.last_release(), Some("2.4.0"));
    assert!(matches!(
        client.fetch_package("trytond", false),
        Err(Error::Unsupported(_))
    ));
    assert!(matches!(client.fetch_package("", true), Err(Error::EmptyPackageName)));
}

#[test]
fn test_display_of_client_and_records() {
    let (mut client, _) = tryton_client();
    client.refresh_package_list(TRYTON).unwrap();
    client.fetch_urls("trytond", "2.4.0").unwrap();

    let rendered = client.to_string();
    assert!(rendered.contains("memory://pypi"));
    assert!(rendered.contains("packages=2"));
    assert!(!rendered.contains("never"));

    let package = client.packages()["trytond"].to_string();
    assert!(package.starts_with("Package \"trytond\""));
    assert!(package.contains("2.2.0, 2.4.0"));

    let release = client.packages()["trytond"].release("2.4.0").unwrap();
    assert!(release.to_string().contains("trytond"));
    let file = release.file("trytond-2.4.0.tar.gz").unwrap();
    assert!(file.to_string().starts_with("ReleaseFile \"trytond-2.4.0.tar.gz\""));

    assert!(client.last_refresh().unwrap() <= Utc::now());
}
