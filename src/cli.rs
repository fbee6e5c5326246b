//! Command-line front door: read a file, run the pipeline, print
//! diagnostics. Exits non-zero on any diagnostic rather than printing a
//! partial result and succeeding.

use std::fs;
use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::ast::AstArena;
use crate::check_source;

#[derive(Parser)]
#[command(name = "truc")]
#[command(about = "Front-end checker for the source language", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Lex, parse, and type-check a source file.
    Check {
        /// Path to the source file.
        path: PathBuf,

        /// Emit the result as JSON instead of human-readable diagnostics.
        #[arg(long)]
        json: bool,
    },
}

/// Entry point for the CLI. Exits with an error on any diagnostic;
/// there is no partial-success exit code, only `ok` or not.
pub fn run_cli() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Check { path, json } => cmd_check(&path, json),
    }
}

fn cmd_check(path: &PathBuf, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let source = fs::read_to_string(path).map_err(|e| format!("{}: {}", path.display(), e))?;
    let file = path.display().to_string();

    let arena = AstArena::new();
    let result = check_source(&source, &file, &arena);

    if json {
        let body = serde_json::to_string_pretty(&result)?;
        println!("{}", body);
    } else if result.ok {
        println!("Check passed");
    } else {
        for diagnostic in &result.errors {
            eprintln!("{}", diagnostic.display_with_source(&source));
        }
    }

    if result.ok {
        Ok(())
    } else {
        Err(format!("{} error(s) found", result.errors.len()).into())
    }
}
