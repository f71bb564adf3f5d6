//! urlfilter-seed: fill an authoritative URL store from a list file.
//!
//! The store written here is the source a `bloom` stage pages from.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;
use urlfilter_core::SqliteStore;

/// Seed a urlfilter SQLite store with known-bad URLs
#[derive(Parser, Debug)]
#[command(name = "urlfilter-seed")]
#[command(about = "Insert known-bad URLs, one per line, into a urlfilter store")]
struct Args {
    /// File with one URL per line; blank lines are skipped
    #[arg(short, long)]
    list: PathBuf,

    /// SQLite database to seed
    #[arg(short, long, default_value = "./urlfilter.sqlite")]
    db: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    let args = Args::parse();
    let store = SqliteStore::open(&args.db)
        .await
        .with_context(|| format!("failed to open store {}", args.db.display()))?;

    let added = seed_from_file(&store, &args.list).await?;
    let total = store.count().await?;

    tracing::info!(added, total, db = %args.db.display(), "seeding complete");
    println!("added {added} URLs to {} ({total} total)", args.db.display());
    Ok(())
}

/// Insert every URL listed in `path`, returning how many were new.
async fn seed_from_file(store: &SqliteStore, path: &Path) -> Result<u64> {
    let contents = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))?;

    let urls = parse_list(&contents);
    tracing::debug!(listed = urls.len(), "read URL list");

    Ok(store.insert_many(urls).await?)
}

/// One URL per line. Surrounding whitespace is trimmed; nothing else is
/// normalised.
fn parse_list(contents: &str) -> Vec<String> {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use urlfilter_core::Connector;

    #[test]
    fn test_parse_list_skips_blank_lines() {
        let urls = parse_list("facebook.com\n\n  \ngoogle.ca/facebook\r\n eeeh.com/facebook/what \n");
        assert_eq!(urls, vec!["facebook.com", "google.ca/facebook", "eeeh.com/facebook/what"]);
    }

    #[test]
    fn test_parse_list_empty() {
        assert!(parse_list("").is_empty());
        assert!(parse_list("\n\n").is_empty());
    }

    #[test]
    fn test_args_defaults() {
        let args = Args::parse_from(["urlfilter-seed", "--list", "bad.txt"]);
        assert_eq!(args.list, PathBuf::from("bad.txt"));
        assert_eq!(args.db, PathBuf::from("./urlfilter.sqlite"));
    }

    #[tokio::test]
    async fn test_seed_from_file() {
        let mut list = tempfile::NamedTempFile::new().unwrap();
        write!(list, "facebook.com\ncisco.com\n\nfacebook.com\n").unwrap();

        let store = SqliteStore::open_in_memory().await.unwrap();
        let added = seed_from_file(&store, list.path()).await.unwrap();

        assert_eq!(added, 2);
        assert!(store.contains_key("cisco.com").await.unwrap());
        assert!(store.contains_key("facebook.com").await.unwrap());
    }

    #[tokio::test]
    async fn test_seed_missing_file_fails() {
        let store = SqliteStore::open_in_memory().await.unwrap();
        let result = seed_from_file(&store, Path::new("/nonexistent/urlfilter-list.txt")).await;
        assert!(result.is_err());
    }
}
