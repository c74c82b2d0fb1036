// src/commands/show.rs
//! Show cached records without contacting the index

use super::Session;
use anyhow::{Result, anyhow};

/// Print a cached package, or one of its releases
pub fn cmd_show(session: &mut Session, name: &str, version: Option<&str>) -> Result<()> {
    let Some(package) = session.client.fetch_package(name, true)? else {
        return Err(anyhow!(
            "Package '{}' is not cached; run 'refresh' or 'releases {}' first",
            name,
            name
        ));
    };

    match version {
        None => println!("{}", package),
        Some(version) => {
            let release = package.release(version).ok_or_else(|| {
                anyhow!("Release '{}' of '{}' is not cached", version, name)
            })?;
            println!("{}", release);
            for file in release.files().values() {
                println!("{}", file);
            }
        }
    }
    Ok(())
}
