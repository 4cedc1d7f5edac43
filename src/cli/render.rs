use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use songdeck::{AppConfig, DeckConfig, PageGrid, TrackList, TrackRecord, plan_sheets, render_deck_pdf};

use super::common::{LayoutArgs, default_pdf_path};
use super::utils::{ensure_parent_dir, printing_instructions, write_output};

#[derive(Args, Debug)]
pub struct RenderArgs {
    /// Track list file produced by `fetch`.
    pub tracks: PathBuf,

    /// PDF file to write.
    #[arg(short = 'o', long = "output", default_value_os_t = default_pdf_path())]
    pub output: PathBuf,

    #[command(flatten)]
    pub layout: LayoutArgs,
}

#[derive(Args, Debug)]
pub struct PlanArgs {
    /// Track list file produced by `fetch`.
    pub tracks: PathBuf,

    /// Destination for the plan, `-` for stdout.
    #[arg(short = 'o', long = "output", default_value = "-")]
    pub output: PathBuf,

    #[command(flatten)]
    pub layout: LayoutArgs,
}

pub fn handle(args: RenderArgs, config: &AppConfig) -> Result<()> {
    let list = load_tracks(&args.tracks)?;
    let deck = args.layout.apply(&config.deck);
    render_to(&list.tracks, &deck, &args.output)
}

/// Render `tracks` into a PDF at `output` and print the duplex instructions.
pub fn render_to(tracks: &[TrackRecord], deck: &DeckConfig, output: &Path) -> Result<()> {
    ensure_parent_dir(output)?;
    let summary = render_deck_pdf(tracks, deck, output)
        .with_context(|| format!("failed to render {}", output.display()))?;
    print!("{}", printing_instructions(output, summary.pages));
    Ok(())
}

pub fn plan(args: PlanArgs, config: &AppConfig) -> Result<()> {
    let list = load_tracks(&args.tracks)?;
    let grid = args.layout.apply(&config.deck).grid()?;
    let text = format_plan(&list.tracks, &grid)?;
    write_output(&args.output, &text)
}

fn load_tracks(path: &Path) -> Result<TrackList> {
    TrackList::load(path).with_context(|| format!("failed to load {}", path.display()))
}

/// One line per card: page numbers and slot for both faces.
pub fn format_plan(tracks: &[TrackRecord], grid: &PageGrid) -> Result<String> {
    let sheets = plan_sheets(tracks.len(), grid)?;
    let mut out = String::new();
    writeln!(
        out,
        "{} card(s), {}x{} per page, {} page(s)",
        tracks.len(),
        grid.cols(),
        grid.rows(),
        sheets.len() * 2
    )?;
    for (sheet_idx, sheet) in sheets.iter().enumerate() {
        let front_page = sheet_idx * 2 + 1;
        for (front, back) in sheet.front.iter().zip(&sheet.back) {
            let track = &tracks[front.record];
            writeln!(
                out,
                "#{:<4} p{} slot {} / p{} slot {}  {} - {} ({})",
                front.record + 1,
                front_page,
                front.slot,
                front_page + 1,
                back.slot,
                track.artists,
                track.title,
                track.year
            )?;
        }
    }
    Ok(out)
}
