//! Shared clap argument groups and configuration resolution.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use songdeck::{AppConfig, DeckConfig, FetchConfig};

/// Settings file picked up from the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = "songdeck.toml";

/// Load the explicit config file, the default one if present, or built-in defaults.
pub fn load_config(path: Option<&Path>) -> Result<AppConfig> {
    match path {
        Some(path) => AppConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display())),
        None => {
            let default = Path::new(DEFAULT_CONFIG_FILE);
            if default.is_file() {
                AppConfig::load(default).with_context(|| {
                    format!("failed to load config {}", default.display())
                })
            } else {
                Ok(AppConfig::default())
            }
        }
    }
}

/// Page layout overrides accepted by rendering commands.
#[derive(Args, Debug, Clone, Default)]
pub struct LayoutArgs {
    /// Cards per row.
    #[arg(long)]
    pub cols: Option<usize>,
    /// Card rows per page.
    #[arg(long)]
    pub rows: Option<usize>,
    /// Page margin in points.
    #[arg(long)]
    pub margin: Option<f32>,
    /// Page width in points.
    #[arg(long = "page-width")]
    pub page_width: Option<f32>,
    /// Page height in points.
    #[arg(long = "page-height")]
    pub page_height: Option<f32>,
    /// Pixel size of the rasterised QR code.
    #[arg(long = "code-pixels")]
    pub code_pixels: Option<u32>,
}

impl LayoutArgs {
    pub fn apply(&self, base: &DeckConfig) -> DeckConfig {
        DeckConfig {
            page_width: self.page_width.unwrap_or(base.page_width),
            page_height: self.page_height.unwrap_or(base.page_height),
            margin: self.margin.unwrap_or(base.margin),
            cols: self.cols.unwrap_or(base.cols),
            rows: self.rows.unwrap_or(base.rows),
            code_pixels: self.code_pixels.unwrap_or(base.code_pixels),
        }
    }
}

/// Playlist selection shared by `fetch` and `build`.
#[derive(Args, Debug, Clone, Default)]
pub struct PlaylistArgs {
    /// Playlist URL, URI or id; repeat once per player. Prompts when omitted.
    #[arg(short = 'p', long = "playlist")]
    pub playlists: Vec<String>,
    /// Songs to take from each playlist.
    #[arg(short = 'n', long)]
    pub count: Option<usize>,
    /// Skip tracks below this popularity (0-100).
    #[arg(long = "min-popularity")]
    pub min_popularity: Option<u32>,
}

impl PlaylistArgs {
    pub fn apply(&self, base: &FetchConfig) -> FetchConfig {
        FetchConfig {
            songs_per_playlist: self.count.unwrap_or(base.songs_per_playlist),
            min_popularity: self.min_popularity.unwrap_or(base.min_popularity),
        }
    }
}

/// Default PDF output path.
pub fn default_pdf_path() -> PathBuf {
    PathBuf::from("game_cards.pdf")
}
