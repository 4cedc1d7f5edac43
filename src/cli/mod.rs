//! Command-line interface wiring for the `songdeck` binary.
//!
//! This module owns the clap definitions and delegates execution to the
//! submodule for each command.

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{Parser, Subcommand};

pub mod build;
pub mod common;
pub mod fetch;
pub mod liked;
pub mod render;
pub mod utils;

/// Parsed CLI entrypoint for the `songdeck` binary.
#[derive(Parser, Debug)]
#[command(
    name = "songdeck",
    version,
    about = "Printable song-card decks with QR codes from music playlists"
)]
pub struct Cli {
    /// TOML settings file (defaults to ./songdeck.toml when present).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Command to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Commands made available to end users.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Fetch playlist tracks into a track list file.
    Fetch(fetch::FetchArgs),
    /// Render a track list file into a printable PDF deck.
    Render(render::RenderArgs),
    /// Fetch playlists and render the deck in one go.
    Build(build::BuildArgs),
    /// Show which card slot every track lands in, front and back.
    Plan(render::PlanArgs),
    /// Export your liked songs above a popularity threshold.
    Liked(liked::LikedArgs),
}

/// Execute the requested command.
pub fn run(cli: Cli) -> Result<()> {
    utils::load_env_file(Path::new("."))?;
    let config = common::load_config(cli.config.as_deref())?;
    match cli.command {
        Command::Fetch(args) => fetch::handle(args, &config),
        Command::Render(args) => render::handle(args, &config),
        Command::Build(args) => build::handle(args, &config),
        Command::Plan(args) => render::plan(args, &config),
        Command::Liked(args) => liked::handle(args),
    }
}
