use crate::config::OutputFormat;
use crate::logging::LogFormat;
use crate::page::InstallPoint;
use crate::registry::StagingPolicy;
use crate::site::TraitPath;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "rustdoc-implementors")]
#[command(about = "Inspect and emit rustdoc implementor data files", long_about = None)]
pub struct Cli {
    /// Doc output directory to read (repeatable; overrides the config file)
    #[arg(short = 'd', long = "doc-root", global = true)]
    pub doc_roots: Vec<PathBuf>,

    /// Config file (defaults to ./rustdoc-implementors.toml, then the user config dir)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Log output format
    #[arg(long, global = true, value_enum)]
    pub log_format: Option<LogFormat>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// List every trait that has implementor data
    Traits,
    /// Load a trait's page and print its implementor list
    List {
        /// Trait path, e.g. core::clone::Clone
        trait_path: TraitPath,
        /// When the registrar is installed: before-data, after-data or after-files:N
        #[arg(short, long)]
        install: Option<InstallPoint>,
        /// What to do with payloads published before the registrar exists
        #[arg(short, long, value_enum)]
        staging: Option<StagingPolicy>,
        #[arg(short, long, value_enum)]
        format: Option<OutputFormat>,
    },
    /// Parse every data file and report the ones that fail
    Check,
    /// Write a data file from a JSON payload ({"crate": ["<html>", ...]})
    Emit {
        /// JSON payload file
        payload: PathBuf,
        /// Data file to write
        #[arg(short, long)]
        output: PathBuf,
    },
}
