/*
 * main.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Versatile CLI - main entry point
 */

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "versatile")]
#[command(version)]
#[command(about = "Render documents from a Versatile content tree", long_about = None)]
struct Cli {
    /// Verbose output (-v for debug, -vv for trace)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render one document and print it as JSON
    Render {
        /// Content root directory
        #[arg(value_name = "ROOT")]
        root: PathBuf,

        /// Identifier of the document to render
        #[arg(value_name = "ID")]
        id: String,

        /// Extra context value (KEY=VALUE), can be repeated
        #[arg(long = "set", value_name = "KEY=VALUE", value_parser = commands::render::parse_assignment)]
        set: Vec<(String, String)>,

        /// TOML file with file-type overrides
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// List every document identifier in a content tree
    List {
        /// Content root directory
        #[arg(value_name = "ROOT")]
        root: PathBuf,

        /// TOML file with file-type overrides
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

fn default_filter(verbose: u8) -> &'static str {
    match verbose {
        0 => "versatile=info",
        1 => "versatile=debug",
        _ => "versatile=trace",
    }
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // Initialize logging. RUST_LOG wins over -v.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter(cli.verbose).into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match cli.command {
        Commands::Render {
            root,
            id,
            set,
            config,
        } => commands::render::execute(commands::render::RenderArgs {
            root,
            id,
            set,
            config,
        }),
        Commands::List { root, config } => {
            commands::list::execute(commands::list::ListArgs { root, config })?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_render_arguments() {
        let cli = Cli::parse_from([
            "versatile", "-vv", "render", "site", "home", "--set", "user=ann", "--set", "a=b=c",
        ]);
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Render { root, id, set, config } => {
                assert_eq!(root, PathBuf::from("site"));
                assert_eq!(id, "home");
                assert_eq!(
                    set,
                    vec![
                        ("user".to_string(), "ann".to_string()),
                        ("a".to_string(), "b=c".to_string()),
                    ]
                );
                assert!(config.is_none());
            }
            Commands::List { .. } => panic!("expected render"),
        }
    }

    #[test]
    fn test_rejects_malformed_assignment() {
        assert!(Cli::try_parse_from(["versatile", "render", "site", "home", "--set", "novalue"]).is_err());
    }

    #[test]
    fn test_default_filter() {
        assert_eq!(default_filter(0), "versatile=info");
        assert_eq!(default_filter(1), "versatile=debug");
        assert_eq!(default_filter(5), "versatile=trace");
    }
}
