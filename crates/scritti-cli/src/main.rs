//! scritti asset CLI.
//!
//! Provides the `scritti` binary for reading, writing and watching assets
//! under an on-disk root, through the same store the server uses. Exit
//! codes: 0 = success, 1 = asset error, 2 = bad arguments, 3 = I/O error.

use std::io::{self, Write};
use std::path::PathBuf;
use std::process;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use scritti_core::{AssetKey, AssetKind};
use scritti_storage::OsFileSystem;
use scritti_store::{AssetStore, StoreConfig, StoreError};

/// Read, write and watch scritti assets.
#[derive(Parser)]
#[command(name = "scritti", about = "Read, write and watch scritti assets")]
struct Cli {
    /// Asset root directory.
    #[arg(long, global = true, default_value = "sampledata")]
    root: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print an asset's source and the keys it depends on.
    Get {
        kind: String,
        name: String,
        /// Print a JSON object instead of plain text.
        #[arg(long)]
        json: bool,
    },
    /// Replace an asset's source.
    Set {
        kind: String,
        name: String,
        /// New source text.
        #[arg(conflicts_with = "file", required_unless_present = "file")]
        content: Option<String>,
        /// Read the new source from a file.
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
    /// Print one JSON line per change until interrupted.
    Watch { kind: String, name: String },
}

#[tokio::main]
async fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let store = AssetStore::new(Arc::new(OsFileSystem::new()), StoreConfig::new(cli.root));
    let mut stdout = io::stdout();

    let exit_code = match cli.command {
        Commands::Get { kind, name, json } => match parse_key(&kind, name) {
            Ok(key) => run_get(&store, &key, json, &mut stdout).await,
            Err(code) => code,
        },
        Commands::Set {
            kind,
            name,
            content,
            file,
        } => match (parse_key(&kind, name), read_content(content, file)) {
            (Ok(key), Ok(content)) => run_set(&store, &key, &content).await,
            (Err(code), _) | (_, Err(code)) => code,
        },
        Commands::Watch { kind, name } => match parse_key(&kind, name) {
            Ok(key) => {
                let cancel = CancellationToken::new();
                let interrupt = cancel.clone();
                tokio::spawn(async move {
                    if tokio::signal::ctrl_c().await.is_ok() {
                        interrupt.cancel();
                    }
                });
                run_watch(&store, &key, cancel, &mut stdout).await
            }
            Err(code) => code,
        },
    };

    store.close().await;
    process::exit(exit_code);
}

fn parse_key(kind: &str, name: String) -> Result<AssetKey, i32> {
    match kind.parse::<AssetKind>() {
        Ok(kind) => Ok(AssetKey::new(kind, name)),
        Err(e) => {
            eprintln!("Error: {}", e);
            Err(2)
        }
    }
}

fn read_content(content: Option<String>, file: Option<PathBuf>) -> Result<String, i32> {
    match (content, file) {
        (Some(content), _) => Ok(content),
        (None, Some(path)) => std::fs::read_to_string(&path).map_err(|e| {
            eprintln!("Error: cannot read '{}': {}", path.display(), e);
            3
        }),
        (None, None) => {
            eprintln!("Error: no content given");
            Err(2)
        }
    }
}

fn report(err: &StoreError) -> i32 {
    eprintln!("Error: {}", err);
    match err {
        StoreError::InvalidKey { .. } => 2,
        StoreError::Storage { .. } => 3,
        _ => 1,
    }
}

/// Execute the get subcommand.
async fn run_get(store: &AssetStore, key: &AssetKey, json: bool, out: &mut impl Write) -> i32 {
    let asset = match store.get(key).await {
        Ok(asset) => asset,
        Err(err) => return report(&err),
    };
    let dependencies = store.dependencies(key).await;

    let written = if json {
        let value = serde_json::json!({
            "id": key,
            "source": asset.source(),
            "dependencies": dependencies,
        });
        writeln!(out, "{}", value)
    } else {
        writeln!(out, "{}", asset.source()).and_then(|_| {
            dependencies
                .iter()
                .try_for_each(|dependency| writeln!(out, "# depends on {}", dependency))
        })
    };

    match written {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("Error: {}", e);
            3
        }
    }
}

/// Execute the set subcommand.
async fn run_set(store: &AssetStore, key: &AssetKey, content: &str) -> i32 {
    match store.set(key, content).await {
        Ok(()) => 0,
        Err(err) => report(&err),
    }
}

/// Execute the watch subcommand.
async fn run_watch(
    store: &AssetStore,
    key: &AssetKey,
    cancel: CancellationToken,
    out: &mut impl Write,
) -> i32 {
    let mut events = match store.watch(key, cancel).await {
        Ok(events) => events,
        Err(err) => return report(&err),
    };

    while let Some(event) = events.recv().await {
        let line = match serde_json::to_string(&event) {
            Ok(line) => line,
            Err(e) => {
                eprintln!("Error: {}", e);
                return 1;
            }
        };
        if writeln!(out, "{}", line).and_then(|_| out.flush()).is_err() {
            return 3;
        }
    }
    0
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::time::Duration;

    use super::*;

    fn disk_store(dir: &tempfile::TempDir) -> AssetStore {
        AssetStore::new(
            Arc::new(OsFileSystem::new()),
            StoreConfig::new(dir.path()),
        )
    }

    #[test]
    fn parses_global_root_after_subcommand() {
        let cli = Cli::try_parse_from(["scritti", "get", "style", "root", "--root", "/tmp/a"]).unwrap();
        assert_eq!(cli.root, PathBuf::from("/tmp/a"));
        assert!(matches!(cli.command, Commands::Get { json: false, .. }));
    }

    #[test]
    fn set_requires_content_or_file() {
        assert!(Cli::try_parse_from(["scritti", "set", "style", "root"]).is_err());
        assert!(Cli::try_parse_from(["scritti", "set", "style", "root", "a", "--file", "x"]).is_err());
        assert!(Cli::try_parse_from(["scritti", "set", "style", "root", "--file", "x"]).is_ok());
    }

    #[test]
    fn unknown_kind_is_usage_error() {
        assert_eq!(parse_key("font", "x".to_string()), Err(2));
        assert_eq!(
            parse_key("svg", "logo".to_string()),
            Ok(AssetKey::svg("logo"))
        );
    }

    #[tokio::test]
    async fn get_prints_source_and_dependencies() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("main"), "root\n\tchild").unwrap();
        let store = disk_store(&dir);

        let mut out = Vec::new();
        let code = run_get(&store, &AssetKey::component("main"), false, &mut out).await;
        assert_eq!(code, 0);
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "root\n\tchild\n# depends on style:child\n# depends on style:root\n"
        );
        store.close().await;
    }

    #[tokio::test]
    async fn set_writes_under_kind_directory() {
        let dir = tempfile::tempdir().unwrap();
        let store = disk_store(&dir);

        assert_eq!(run_set(&store, &AssetKey::style("theme"), "dark").await, 0);
        assert_eq!(fs::read_to_string(dir.path().join("style/theme")).unwrap(), "dark");

        let mut out = Vec::new();
        assert_eq!(run_get(&store, &AssetKey::style("missing"), false, &mut out).await, 1);
        store.close().await;
    }

    #[tokio::test]
    async fn watch_ends_when_cancelled() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("main"), "root").unwrap();
        let store = disk_store(&dir);

        let cancel = CancellationToken::new();
        cancel.cancel();
        let mut out = Vec::new();
        let code = tokio::time::timeout(
            Duration::from_secs(5),
            run_watch(&store, &AssetKey::component("main"), cancel, &mut out),
        )
        .await
        .unwrap();
        assert_eq!(code, 0);
        assert!(out.is_empty());
        store.close().await;
    }
}
