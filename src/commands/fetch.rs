// src/commands/fetch.rs
//! Per-package and per-release fetch commands

use super::{Session, found};
use anyhow::Result;
use tracing::info;

/// Fetch the releases of a package
pub fn cmd_releases(session: &mut Session, name: &str, show_hidden: bool) -> Result<()> {
    info!("Fetching releases of {}", name);
    if let Some(summary) = found(session.client.fetch_releases(name, show_hidden))? {
        println!(
            "{}: {} release(s), {} new",
            name, summary.found, summary.new
        );
        if let Some(package) = session.client.packages().get(name) {
            println!("  Last release: {}", package.last_release().unwrap_or("-"));
        }
    }
    session.save()
}

/// Fetch the role assignments of a package
pub fn cmd_roles(session: &mut Session, name: &str) -> Result<()> {
    info!("Fetching roles of {}", name);
    if let Some(summary) = found(session.client.fetch_roles(name))? {
        println!("{}: {} role(s), {} new", name, summary.found, summary.new);
        if let Some(package) = session.client.packages().get(name) {
            for (role, users) in package.roles() {
                println!("  {}: {}", role, users.join(", "));
            }
        }
    }
    session.save()
}

/// Fetch the download counts of a release
pub fn cmd_downloads(session: &mut Session, name: &str, version: &str) -> Result<()> {
    info!("Fetching downloads of {} {}", name, version);
    if let Some(summary) = found(session.client.fetch_downloads(name, version))? {
        println!(
            "{} {}: {} file(s), {} new",
            name, version, summary.found, summary.new
        );
        print_files(session, name, version);
    }
    session.save()
}

/// Fetch the file metadata of a release
pub fn cmd_urls(session: &mut Session, name: &str, version: &str) -> Result<()> {
    info!("Fetching URLs of {} {}", name, version);
    if let Some(summary) = found(session.client.fetch_urls(name, version))? {
        println!(
            "{} {}: {} file(s), {} new",
            name, version, summary.found, summary.new
        );
        print_files(session, name, version);
    }
    session.save()
}

/// Fetch the descriptive metadata of a release
pub fn cmd_release_data(session: &mut Session, name: &str, version: &str) -> Result<()> {
    info!("Fetching release data of {} {}", name, version);
    if let Some(changed) = found(session.client.fetch_release_data(name, version))? {
        if changed {
            println!("{} {}: release data updated", name, version);
        } else {
            println!("{} {}: release data unchanged", name, version);
        }
    }
    session.save()
}

fn print_files(session: &Session, name: &str, version: &str) {
    let Some(release) = session
        .client
        .packages()
        .get(name)
        .and_then(|package| package.release(version))
    else {
        return;
    };
    for file in release.files().values() {
        println!(
            "  {} ({} downloads){}",
            file.filename,
            file.downloads,
            if file.url.is_empty() {
                String::new()
            } else {
                format!("\n      {}", file.url)
            }
        );
    }
}
