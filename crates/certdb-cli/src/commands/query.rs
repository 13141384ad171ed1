//! Query command implementation

use anyhow::{Context, Result};
use certdb::prelude::*;
use certdb::query::{format_detail, format_table};

use super::StoreArgs;
use crate::QueryCommands;

/// Queries only read, so a mistyped path must not leave an empty store behind
fn open(store: &StoreArgs) -> Result<CertDb> {
    let config = store.store_config();
    let path = config.path.clone();
    CertDb::open_existing(config)
        .with_context(|| format!("Failed to open store at {}", path.display()))
}

pub fn execute(cmd: QueryCommands) -> Result<()> {
    match cmd {
        QueryCommands::Get { domain, store } => {
            let db = open(&store)?;
            match db.lookup(&domain).context("Lookup failed")? {
                Some(entry) => println!("{}", format_detail(&entry)),
                None => println!("No certificate stored for '{}'", domain),
            }
            db.close()?;
        }
        QueryCommands::Search {
            needle,
            limit,
            store,
        } => {
            let db = open(&store)?;
            let results = db.search(&needle, limit).context("Search failed")?;
            if results.is_empty() {
                println!("No results found for '{}'", needle);
            }
            for entry in &results {
                println!("\n{}", format_detail(entry));
            }
            db.close()?;
        }
        QueryCommands::Recent { limit, store } => {
            let db = open(&store)?;
            if !db.supports_recency_order() {
                println!(
                    "Note: {} does not track update times; listing in key order",
                    db.backend().label()
                );
            }

            let results = db.list(limit).context("Listing failed")?;
            if results.is_empty() {
                println!("No certificates found in database");
            } else {
                print!("{}", format_table(&results));
            }
            db.close()?;
        }
    }

    Ok(())
}
