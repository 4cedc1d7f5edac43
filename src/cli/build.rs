use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use songdeck::AppConfig;

use super::common::{LayoutArgs, PlaylistArgs, default_pdf_path};
use super::fetch::fetch_track_list;
use super::render::render_to;
use super::utils::ensure_parent_dir;

#[derive(Args, Debug)]
pub struct BuildArgs {
    #[command(flatten)]
    pub playlists: PlaylistArgs,

    #[command(flatten)]
    pub layout: LayoutArgs,

    /// PDF file to write.
    #[arg(short = 'o', long = "output", default_value_os_t = default_pdf_path())]
    pub output: PathBuf,

    /// Also keep the fetched track list at this path.
    #[arg(long = "save-tracks")]
    pub save_tracks: Option<PathBuf>,
}

pub fn handle(args: BuildArgs, config: &AppConfig) -> Result<()> {
    let list = fetch_track_list(&args.playlists, config)?;
    if let Some(path) = &args.save_tracks {
        ensure_parent_dir(path)?;
        list.save(path)
            .with_context(|| format!("failed to write {}", path.display()))?;
    }
    let deck = args.layout.apply(&config.deck);
    render_to(&list.tracks, &deck, &args.output)
}
