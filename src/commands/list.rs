// src/commands/list.rs
//! Package list commands

use super::{Session, found};
use anyhow::Result;
use tracing::info;

/// List cached packages, refreshing the list when stale or forced
pub fn cmd_list(session: &mut Session, force: bool) -> Result<()> {
    info!("Listing packages (force: {})", force);
    let packages = session.client.list_packages(force)?;

    if packages.is_empty() {
        println!("No packages cached");
    } else {
        println!("Packages:");
        for package in &packages {
            println!(
                "  {} {}",
                package.name(),
                package.last_release().unwrap_or("-")
            );
        }
        println!("\nTotal: {} package(s)", packages.len());
    }

    session.save()
}

/// Refresh the package list for `categories`, or the configured ones
pub fn cmd_refresh(session: &mut Session, categories: Vec<String>) -> Result<()> {
    let categories = if categories.is_empty() {
        session.client.categories().to_vec()
    } else {
        categories
    };
    info!("Refreshing package list for: {}", categories.join(", "));

    if let Some(summary) = found(session.client.refresh_package_list(categories))? {
        println!(
            "Refreshed package list: {} found, {} new, {} updated",
            summary.found, summary.new, summary.updated
        );
    }

    session.save()
}
