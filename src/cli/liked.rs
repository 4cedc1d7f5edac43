use std::env;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use clap::{Args, ValueEnum};
use log::info;
use songdeck::config::USER_TOKEN_VAR;
use songdeck::library::{DEFAULT_MIN_POPULARITY, format_table, write_csv};
use songdeck::source::{DEFAULT_REDIRECT_URI, DEFAULT_TOKEN_CACHE, LIBRARY_SCOPE};
use songdeck::{Credentials, LikedTrack, SpotifyClient, UserAuth};

use super::utils::write_output;

/// Output formats for the liked-songs export.
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum LikedFormat {
    Table,
    Csv,
    Json,
}

#[derive(Args, Debug)]
pub struct LikedArgs {
    /// Minimum popularity (0-100).
    #[arg(long, default_value_t = DEFAULT_MIN_POPULARITY)]
    pub popularity: u32,

    /// Output format; inferred from the output extension when omitted.
    #[arg(long, value_enum)]
    pub format: Option<LikedFormat>,

    /// Destination file, `-` for stdout.
    #[arg(short = 'o', long = "output", default_value = "-")]
    pub output: PathBuf,

    /// User access token; skips the browser sign-in.
    #[arg(long)]
    pub token: Option<String>,

    /// File caching the signed-in user's token between runs.
    #[arg(long = "token-cache", default_value = DEFAULT_TOKEN_CACHE)]
    pub token_cache: PathBuf,

    /// Loopback address registered as the app's redirect URI.
    #[arg(long = "redirect-uri", default_value = DEFAULT_REDIRECT_URI)]
    pub redirect_uri: String,
}

pub fn handle(args: LikedArgs) -> Result<()> {
    if args.popularity > 100 {
        return Err(anyhow!("popularity must be between 0 and 100"));
    }
    let token = user_token(&args)?;
    let client = SpotifyClient::with_token(token);
    info!("fetching liked songs with popularity >= {}", args.popularity);
    let tracks = client
        .saved_tracks(args.popularity)
        .context("failed to fetch liked songs")?;
    info!("found {} liked song(s)", tracks.len());
    let format = args.format.unwrap_or_else(|| format_for_path(&args.output));
    if !export(&tracks, format, &args.output)? {
        println!("No liked songs found with popularity >= {}", args.popularity);
    }
    Ok(())
}

/// Explicit token, then the environment, then the browser sign-in.
fn user_token(args: &LikedArgs) -> Result<String> {
    if let Some(token) = args.token.clone().or_else(|| env::var(USER_TOKEN_VAR).ok()) {
        return Ok(token);
    }
    let credentials = Credentials::from_env().context("missing API credentials")?;
    let auth = UserAuth::new(credentials, LIBRARY_SCOPE)
        .with_redirect_uri(args.redirect_uri.as_str())
        .with_cache_path(args.token_cache.clone());
    auth.access_token(|url| {
        println!("Open this page in your browser to allow access to your liked songs:\n\n  {url}\n");
        println!("Waiting for the redirect to {} ...", args.redirect_uri);
    })
    .context("failed to sign in")
}

/// Write `tracks` in `format`; returns `false` without writing when there are none.
fn export(tracks: &[LikedTrack], format: LikedFormat, output: &Path) -> Result<bool> {
    if tracks.is_empty() {
        return Ok(false);
    }
    write_output(output, &render(tracks, format)?)?;
    Ok(true)
}

fn format_for_path(path: &Path) -> LikedFormat {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("csv") => LikedFormat::Csv,
        Some(ext) if ext.eq_ignore_ascii_case("json") => LikedFormat::Json,
        _ => LikedFormat::Table,
    }
}

fn render(tracks: &[LikedTrack], format: LikedFormat) -> Result<String> {
    match format {
        LikedFormat::Table => Ok(format_table(tracks)),
        LikedFormat::Csv => {
            let mut buffer = Vec::new();
            write_csv(tracks, &mut buffer)?;
            Ok(String::from_utf8(buffer)?)
        }
        LikedFormat::Json => {
            let mut json = serde_json::to_string_pretty(tracks)?;
            json.push('\n');
            Ok(json)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample() -> Vec<LikedTrack> {
        vec![LikedTrack {
            name: "Song".to_string(),
            artist: "Band".to_string(),
            album: "Album".to_string(),
            year: "2001".to_string(),
            popularity: 90,
            url: "https://open.spotify.com/track/abc".to_string(),
        }]
    }

    #[test]
    fn json_export_lists_fields() -> Result<()> {
        let json = render(&sample(), LikedFormat::Json)?;
        let value: serde_json::Value = serde_json::from_str(&json)?;
        assert_eq!(value[0]["name"], "Song");
        assert_eq!(value[0]["popularity"], 90);
        Ok(())
    }

    #[test]
    fn format_follows_extension() {
        assert_eq!(format_for_path(Path::new("liked.csv")), LikedFormat::Csv);
        assert_eq!(format_for_path(Path::new("liked.JSON")), LikedFormat::Json);
        assert_eq!(format_for_path(Path::new("-")), LikedFormat::Table);
    }

    #[test]
    fn empty_result_writes_nothing() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("liked.csv");
        assert!(!export(&[], LikedFormat::Csv, &path)?);
        assert!(!path.exists());

        assert!(export(&sample(), LikedFormat::Csv, &path)?);
        assert!(path.exists());
        Ok(())
    }

    #[test]
    fn csv_export_has_header() -> Result<()> {
        let csv = render(&sample(), LikedFormat::Csv)?;
        assert_eq!(csv.lines().next(), Some("name,artist,album,year,popularity,url"));
        Ok(())
    }
}
