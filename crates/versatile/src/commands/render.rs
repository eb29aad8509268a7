/*
 * render.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Render command implementation
 */

//! Render command implementation.
//!
//! Loads a content tree, renders one document and prints it to stdout as
//! JSON. Failures to render are printed as a JSON error object with a
//! `statusCode`, and the process exits with status 1.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use serde_json::json;
use tracing::debug;

use versatile_core::Document;

/// Arguments for the render command
#[derive(Debug)]
pub struct RenderArgs {
    /// Content root directory
    pub root: PathBuf,
    /// Identifier of the document to render
    pub id: String,
    /// Extra context values
    pub set: Vec<(String, String)>,
    /// Optional TOML config file
    pub config: Option<PathBuf>,
}

/// Parse a `KEY=VALUE` argument. Only the first `=` separates.
pub fn parse_assignment(arg: &str) -> Result<(String, String), String> {
    match arg.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected KEY=VALUE, got '{arg}'")),
    }
}

/// Execute the render command
pub fn execute(args: RenderArgs) -> Result<ExitCode> {
    let engine = super::load_engine(&args.root, args.config.as_deref())?;

    let extra: Option<Document> = if args.set.is_empty() {
        None
    } else {
        Some(args.set.into_iter().collect())
    };

    debug!("Rendering {}", args.id);
    let output = match engine.render(args.id.as_str(), extra.as_ref()) {
        Ok(Some(doc)) => {
            println!("{}", serde_json::to_string_pretty(&doc)?);
            return Ok(ExitCode::SUCCESS);
        }
        Ok(None) => json!({
            "error": "The requested document was not found",
            "statusCode": 404,
        }),
        Err(err) => json!({
            "error": err.to_string(),
            "statusCode": err.status_code(),
        }),
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(ExitCode::FAILURE)
}
