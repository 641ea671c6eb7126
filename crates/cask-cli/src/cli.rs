use std::path::PathBuf;

use cask_types::AssetKind;
use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "cask",
    about = "Inspect, preload and migrate a game content root",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Content root; overrides the config file
    #[arg(long, global = true)]
    pub root: Option<PathBuf>,

    /// TOML config file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Cache on-demand loads and refresh the cache on save
    #[arg(long, global = true)]
    pub promote: bool,
}

#[derive(Clone, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Show the layout, migration state and file counts of the content root
    Status(StatusArgs),
    /// Run the startup sequence and report what was cached
    Preload(PreloadArgs),
    /// Load one binary asset
    Get(GetArgs),
    /// Load, create or re-save one document
    Doc(DocArgs),
    /// List the keys found on disk for an asset kind or the documents
    List(ListArgs),
    /// Move legacy document directories into the content root
    Migrate(MigrateArgs),
}

#[derive(Args)]
pub struct StatusArgs {}

#[derive(Args)]
pub struct PreloadArgs {
    /// List every skipped file and duplicate key
    #[arg(long)]
    pub details: bool,
}

#[derive(Args)]
pub struct GetArgs {
    /// font, sprite or effect
    pub kind: AssetKind,
    pub key: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum DocKindArg {
    Screen,
    Options,
    GameObject,
}

#[derive(Args)]
pub struct DocArgs {
    /// Path relative to the document root, extension included
    pub key: String,
    /// Document kind; inferred from the file when omitted
    #[arg(long)]
    pub kind: Option<DocKindArg>,
    /// Use a default document when the file is missing
    #[arg(long)]
    pub create: bool,
    /// Write the document back to disk
    #[arg(long)]
    pub save: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum ListTarget {
    Fonts,
    Sprites,
    Effects,
    Documents,
}

#[derive(Args)]
pub struct ListArgs {
    pub target: ListTarget,
}

#[derive(Args)]
pub struct MigrateArgs {
    /// Only report the state and the legacy directories that would move
    #[arg(long)]
    pub check: bool,
}
