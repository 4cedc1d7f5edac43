use std::env;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use log::info;
use songdeck::{AppConfig, Credentials, FetchConfig, SpotifyClient, TrackList, fetch_playlists};

use super::common::PlaylistArgs;
use super::utils::{ensure_parent_dir, prompt_count, prompt_playlists};

#[derive(Args, Debug)]
pub struct FetchArgs {
    #[command(flatten)]
    pub playlists: PlaylistArgs,

    /// Track list file to write.
    #[arg(short = 'o', long = "output", default_value = "tracks.jsonl")]
    pub output: PathBuf,
}

pub fn handle(args: FetchArgs, config: &AppConfig) -> Result<()> {
    let list = fetch_track_list(&args.playlists, config)?;
    ensure_parent_dir(&args.output)?;
    list.save(&args.output)
        .with_context(|| format!("failed to write {}", args.output.display()))?;
    println!(
        "Wrote {} track(s) from {} playlist(s) to {}",
        list.tracks.len(),
        list.header.playlists.len(),
        args.output.display()
    );
    Ok(())
}

/// Resolve playlists (prompting when none were given) and fetch their tracks.
pub fn fetch_track_list(args: &PlaylistArgs, config: &AppConfig) -> Result<TrackList> {
    let stdin = io::stdin();
    let plan = plan_fetch(
        args,
        config,
        |key| env::var(key).ok(),
        &mut stdin.lock(),
        &mut io::stdout(),
    )?;
    let client = SpotifyClient::connect(&plan.credentials).context("failed to authenticate")?;
    info!(
        "fetching {} song(s) from each of {} playlist(s)",
        plan.settings.songs_per_playlist,
        plan.playlists.len()
    );
    let tracks = fetch_playlists(
        &client,
        &plan.playlists,
        plan.settings.songs_per_playlist,
        plan.settings.min_popularity,
    )
    .context("failed to fetch playlists")?;
    Ok(TrackList::new(plan.playlists, tracks))
}

/// Everything needed to start fetching.
#[derive(Debug)]
pub struct FetchPlan {
    pub credentials: Credentials,
    pub playlists: Vec<String>,
    pub settings: FetchConfig,
}

/// Check credentials, then collect playlists and the song count, prompting
/// on `input` only for what the flags left out.
pub fn plan_fetch<L, R, W>(
    args: &PlaylistArgs,
    config: &AppConfig,
    lookup: L,
    input: &mut R,
    output: &mut W,
) -> Result<FetchPlan>
where
    L: Fn(&str) -> Option<String>,
    R: BufRead,
    W: Write,
{
    let credentials = Credentials::from_lookup(lookup).context("missing API credentials")?;
    let mut settings = args.apply(&config.fetch);
    let playlists = if args.playlists.is_empty() {
        let playlists = prompt_playlists(input, output)?;
        if args.count.is_none() {
            settings.songs_per_playlist = prompt_count(input, output, settings.songs_per_playlist)?;
        }
        playlists
    } else {
        args.playlists.clone()
    };
    Ok(FetchPlan {
        credentials,
        playlists,
        settings,
    })
}
