/*
 * list.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * List command implementation
 */

use std::path::PathBuf;

use anyhow::Result;

/// Arguments for the list command
#[derive(Debug)]
pub struct ListArgs {
    /// Content root directory
    pub root: PathBuf,
    /// Optional TOML config file
    pub config: Option<PathBuf>,
}

/// Execute the list command
///
/// Prints one `id<TAB>filename` line per reachable document, in load order.
pub fn execute(args: ListArgs) -> Result<()> {
    let engine = super::load_engine(&args.root, args.config.as_deref())?;
    let store = engine.store();

    for id in store.ids() {
        let filename = store.get(id).and_then(|doc| doc.filename()).unwrap_or("-");
        println!("{id}\t{filename}");
    }

    Ok(())
}
