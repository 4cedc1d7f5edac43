//! Export of the user's saved ("liked") tracks, filtered by popularity.

use std::io::Write;

use serde::Serialize;

/// Default popularity cut-off for the library export.
pub const DEFAULT_MIN_POPULARITY: u32 = 80;

const CSV_HEADER: [&str; 6] = ["name", "artist", "album", "year", "popularity", "url"];

/// A saved track as exported to CSV or the console table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LikedTrack {
    pub name: String,
    pub artist: String,
    pub album: String,
    pub year: String,
    pub popularity: u32,
    pub url: String,
}

/// Write `tracks` as CSV with a header row.
pub fn write_csv<W: Write>(tracks: &[LikedTrack], writer: &mut W) -> std::io::Result<()> {
    writeln!(writer, "{}", CSV_HEADER.join(","))?;
    for track in tracks {
        let popularity = track.popularity.to_string();
        let fields = [
            track.name.as_str(),
            track.artist.as_str(),
            track.album.as_str(),
            track.year.as_str(),
            popularity.as_str(),
            track.url.as_str(),
        ];
        let row: Vec<String> = fields.iter().map(|field| csv_field(field)).collect();
        writeln!(writer, "{}", row.join(","))?;
    }
    Ok(())
}

fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// Fixed-width console listing: artist, song, popularity, year.
pub fn format_table(tracks: &[LikedTrack]) -> String {
    let rule = "=".repeat(80);
    let mut out = String::new();
    out.push_str(&rule);
    out.push('\n');
    out.push_str(&format!("{:<30} {:<35} {:<5} {:<5}\n", "ARTIST", "SONG", "POP", "YEAR"));
    out.push_str(&rule);
    out.push('\n');
    for track in tracks {
        out.push_str(&format!(
            "{:<30} {:<35} {:<5} {:<5}\n",
            clip(&track.artist, 28),
            clip(&track.name, 33),
            track.popularity,
            track.year
        ));
    }
    out.push_str(&rule);
    out.push('\n');
    out
}

fn clip(value: &str, max_chars: usize) -> String {
    value.chars().take(max_chars).collect()
}
