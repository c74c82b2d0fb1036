// build.rs

use clap::{Arg, ArgAction, Command};
use clap_mangen::Man;
use std::env;
use std::fs;
use std::path::PathBuf;

/// Common arguments: package name and release version
fn name_arg() -> Arg {
    Arg::new("name").required(true).help("Package name")
}

fn version_arg() -> Arg {
    Arg::new("version").required(true).help("Release version")
}

fn build_cli() -> Command {
    Command::new("pypi-client")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Local cache of the Python Package Index")
        .subcommand_required(true)
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .global(true)
                .help("Configuration file (default: <config dir>/pypi-client/config.toml)"),
        )
        .arg(
            Arg::new("snapshot")
                .short('s')
                .long("snapshot")
                .global(true)
                .help("Snapshot file, overriding the configured one"),
        )
        .arg(
            Arg::new("url")
                .short('u')
                .long("url")
                .global(true)
                .help("XML-RPC endpoint, overriding the configured one"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Log debug messages"),
        )
        .subcommand(
            Command::new("list")
                .about("List cached packages, refreshing the list when it is stale")
                .arg(
                    Arg::new("force")
                        .short('f')
                        .long("force")
                        .action(ArgAction::SetTrue)
                        .help("Refresh the package list even if it is recent"),
                ),
        )
        .subcommand(
            Command::new("refresh")
                .about("Refresh the package list from the index")
                .arg(
                    Arg::new("categories")
                        .num_args(0..)
                        .help("Categories to browse (default: configured categories)"),
                ),
        )
        .subcommand(
            Command::new("releases")
                .about("Fetch the releases of a package")
                .arg(name_arg())
                .arg(
                    Arg::new("show_hidden")
                        .long("show-hidden")
                        .action(ArgAction::SetTrue)
                        .help("Include hidden releases"),
                ),
        )
        .subcommand(
            Command::new("roles")
                .about("Fetch the roles of a package")
                .arg(name_arg()),
        )
        .subcommand(
            Command::new("downloads")
                .about("Fetch the download counts of a release")
                .arg(name_arg())
                .arg(version_arg()),
        )
        .subcommand(
            Command::new("urls")
                .about("Fetch the files of a release")
                .arg(name_arg())
                .arg(version_arg()),
        )
        .subcommand(
            Command::new("release-data")
                .about("Fetch the metadata of a release")
                .arg(name_arg())
                .arg(version_arg()),
        )
        .subcommand(
            Command::new("show")
                .about("Show a cached package or release")
                .arg(name_arg())
                .arg(Arg::new("version").help("Release version")),
        )
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    let manifest_dir = match env::var("CARGO_MANIFEST_DIR") {
        Ok(dir) => PathBuf::from(dir),
        Err(e) => {
            println!("cargo:warning=CARGO_MANIFEST_DIR not set: {}", e);
            return;
        }
    };
    let man_dir = manifest_dir.join("man");

    if let Err(e) = fs::create_dir_all(&man_dir) {
        println!("cargo:warning=Failed to create man directory: {}", e);
        return;
    }

    let man = Man::new(build_cli());
    let mut buffer = Vec::new();
    if let Err(e) = man.render(&mut buffer) {
        println!("cargo:warning=Failed to render man page: {}", e);
        return;
    }

    let man_path = man_dir.join("pypi-client.1");
    if let Err(e) = fs::write(&man_path, buffer) {
        println!("cargo:warning=Failed to write man page: {}", e);
    }
}
