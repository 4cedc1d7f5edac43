//! Explicit configuration values handed to each pipeline stage.
//!
//! Defaults are applied once at the CLI boundary; nothing below reads process
//! state except [`Credentials::from_env`], which the binary calls up front.

use serde::Deserialize;
use std::path::Path;

use crate::error::DeckError;
use crate::layout::PageGrid;

/// US Letter width in points.
pub const LETTER_WIDTH_PT: f32 = 612.0;
/// US Letter height in points.
pub const LETTER_HEIGHT_PT: f32 = 792.0;

pub const CLIENT_ID_VAR: &str = "SPOTIFY_CLIENT_ID";
pub const CLIENT_SECRET_VAR: &str = "SPOTIFY_CLIENT_SECRET";
pub const USER_TOKEN_VAR: &str = "SPOTIFY_USER_TOKEN";

/// Page geometry and code rendering settings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DeckConfig {
    pub page_width: f32,
    pub page_height: f32,
    pub margin: f32,
    pub cols: usize,
    pub rows: usize,
    /// Edge length of the rasterised code image before it is placed on a card.
    pub code_pixels: u32,
}

impl Default for DeckConfig {
    fn default() -> Self {
        Self {
            page_width: LETTER_WIDTH_PT,
            page_height: LETTER_HEIGHT_PT,
            margin: 18.0,
            cols: 2,
            rows: 3,
            code_pixels: 200,
        }
    }
}

impl DeckConfig {
    pub fn cards_per_page(&self) -> usize {
        self.cols * self.rows
    }

    /// Validate the settings and derive the page grid.
    pub fn grid(&self) -> Result<PageGrid, DeckError> {
        if self.code_pixels == 0 {
            return Err(DeckError::Configuration(
                "code image size must be at least one pixel".to_string(),
            ));
        }
        PageGrid::new(
            self.page_width,
            self.page_height,
            self.margin,
            self.cols,
            self.rows,
        )
    }
}

/// Settings consumed by the fetch stage.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    pub songs_per_playlist: usize,
    /// Tracks below this catalog popularity (0-100) are skipped.
    pub min_popularity: u32,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            songs_per_playlist: 10,
            min_popularity: 0,
        }
    }
}

/// Contents of the optional `songdeck.toml` file.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub deck: DeckConfig,
    pub fetch: FetchConfig,
}

impl AppConfig {
    pub fn load(path: &Path) -> Result<Self, DeckError> {
        let contents = std::fs::read_to_string(path).map_err(|err| {
            DeckError::Configuration(format!("failed to read {}: {}", path.display(), err))
        })?;
        Self::from_toml(&contents).map_err(|err| match err {
            DeckError::Configuration(msg) => {
                DeckError::Configuration(format!("{}: {}", path.display(), msg))
            }
            other => other,
        })
    }

    pub fn from_toml(contents: &str) -> Result<Self, DeckError> {
        toml::from_str(contents).map_err(|err| DeckError::Configuration(err.to_string()))
    }
}

/// Client credentials for the catalog Web API.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .finish()
    }
}

impl Credentials {
    pub fn from_env() -> Result<Self, DeckError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolve credentials through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, DeckError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        match (read(CLIENT_ID_VAR), read(CLIENT_SECRET_VAR)) {
            (Some(client_id), Some(client_secret)) => Ok(Self {
                client_id,
                client_secret,
            }),
            _ => Err(DeckError::Configuration(format!(
                "catalog credentials not found; set {CLIENT_ID_VAR} and {CLIENT_SECRET_VAR}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn partial_toml_keeps_defaults() -> anyhow::Result<()> {
        let cfg = AppConfig::from_toml(
            r#"
[deck]
margin = 24.0
cols = 3

[fetch]
min_popularity = 40
"#,
        )?;

        assert_eq!(cfg.deck.margin, 24.0);
        assert_eq!(cfg.deck.cols, 3);
        assert_eq!(cfg.deck.rows, 3);
        assert_eq!(cfg.deck.page_width, LETTER_WIDTH_PT);
        assert_eq!(cfg.fetch.min_popularity, 40);
        assert_eq!(cfg.fetch.songs_per_playlist, 10);
        Ok(())
    }

    #[test]
    fn empty_toml_is_default() -> anyhow::Result<()> {
        assert_eq!(AppConfig::from_toml("")?, AppConfig::default());
        Ok(())
    }

    #[test]
    fn malformed_toml_is_configuration_error() {
        let err = AppConfig::from_toml("[deck]\ncols = \"two\"").unwrap_err();
        assert!(matches!(err, DeckError::Configuration(_)));
    }

    #[test]
    fn default_deck_is_two_by_three() -> anyhow::Result<()> {
        let cfg = DeckConfig::default();
        assert_eq!(cfg.cards_per_page(), 6);
        let grid = cfg.grid()?;
        assert_eq!(grid.cell_width(), 288.0);
        assert_eq!(grid.cell_height(), 252.0);
        Ok(())
    }

    #[test]
    fn zero_code_pixels_rejected() {
        let cfg = DeckConfig {
            code_pixels: 0,
            ..DeckConfig::default()
        };
        assert!(matches!(cfg.grid(), Err(DeckError::Configuration(_))));
    }

    #[test]
    fn credentials_require_both_values() {
        let missing = Credentials::from_lookup(|key| {
            (key == CLIENT_ID_VAR).then(|| "id".to_string())
        });
        assert!(matches!(missing, Err(DeckError::Configuration(_))));

        let blank = Credentials::from_lookup(|_| Some("  ".to_string()));
        assert!(blank.is_err());

        let found = Credentials::from_lookup(|key| Some(format!("{key}-value")));
        let creds = found.expect("both values present");
        assert_eq!(creds.client_id, "SPOTIFY_CLIENT_ID-value");
        assert!(!format!("{creds:?}").contains("SECRET-value"));
    }
}
