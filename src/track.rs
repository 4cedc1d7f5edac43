use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use crate::error::DeckError;

const TRACK_LIST_VERSION: u8 = 1;

/// Year label used when the catalog has no release date.
pub const UNKNOWN_YEAR: &str = "Unknown";

/// One playable item destined for a card.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TrackRecord {
    pub title: String,
    /// Performer names joined with `", "` in catalog order.
    pub artists: String,
    /// Four-digit year or [`UNKNOWN_YEAR`].
    pub year: String,
    /// Payload encoded into the scannable code.
    pub url: String,
    #[serde(default)]
    pub popularity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub player: Option<String>,
}

impl TrackRecord {
    pub fn new<T, A, Y, U>(title: T, artists: A, year: Y, url: U) -> Self
    where
        T: Into<String>,
        A: Into<String>,
        Y: Into<String>,
        U: Into<String>,
    {
        Self {
            title: title.into(),
            artists: artists.into(),
            year: year.into(),
            url: url.into(),
            popularity: 0,
            player: None,
        }
    }

    /// Extract the year from a catalog release date (`YYYY`, `YYYY-MM` or `YYYY-MM-DD`).
    pub fn year_from_release_date(release_date: Option<&str>) -> String {
        match release_date.map(str::trim) {
            Some(date) if !date.is_empty() => date
                .split('-')
                .next()
                .unwrap_or(UNKNOWN_YEAR)
                .to_string(),
            _ => UNKNOWN_YEAR.to_string(),
        }
    }
}

/// Metadata written as the first line of a track list file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TrackListHeader {
    pub version: u8,
    #[serde(default)]
    pub playlists: Vec<String>,
}

impl TrackListHeader {
    pub fn new(playlists: Vec<String>) -> Self {
        Self {
            version: TRACK_LIST_VERSION,
            playlists,
        }
    }
}

/// Ordered tracks handed from the fetch stage to the render stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackList {
    pub header: TrackListHeader,
    pub tracks: Vec<TrackRecord>,
}

impl TrackList {
    pub fn new(playlists: Vec<String>, tracks: Vec<TrackRecord>) -> Self {
        Self {
            header: TrackListHeader::new(playlists),
            tracks,
        }
    }

    pub fn load(path: &Path) -> Result<Self, DeckError> {
        let file = OpenOptions::new().read(true).open(path)?;
        let reader = BufReader::new(file);
        let mut lines = reader.lines();
        let header_line = lines.next().ok_or_else(|| {
            DeckError::TrackFile(format!("track list {} is empty", path.display()))
        })??;
        let header = match parse_line(&header_line, 1, path)? {
            TrackLine::Header(header) => header,
            TrackLine::Track(_) => {
                return Err(DeckError::TrackFile(format!(
                    "expected a header as the first line of {}",
                    path.display()
                )));
            }
        };
        if header.version != TRACK_LIST_VERSION {
            return Err(DeckError::TrackFile(format!(
                "unsupported track list version {} in {}",
                header.version,
                path.display()
            )));
        }

        let mut tracks = Vec::new();
        for (idx, raw) in lines.enumerate() {
            let raw = raw?;
            if raw.trim().is_empty() {
                continue;
            }
            let line_no = idx + 2;
            match parse_line(&raw, line_no, path)? {
                TrackLine::Header(_) => {
                    return Err(DeckError::TrackFile(format!(
                        "multiple headers found in {} at line {}",
                        path.display(),
                        line_no
                    )));
                }
                TrackLine::Track(track) => {
                    if track.url.trim().is_empty() {
                        return Err(DeckError::TrackFile(format!(
                            "track {:?} at line {} in {} has no URL",
                            track.title,
                            line_no,
                            path.display()
                        )));
                    }
                    tracks.push(track);
                }
            }
        }

        Ok(Self { header, tracks })
    }

    pub fn save(&self, path: &Path) -> Result<(), DeckError> {
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)?;
        let mut writer = BufWriter::new(file);
        write_line(&mut writer, &TrackLine::Header(self.header.clone()))?;
        for track in &self.tracks {
            write_line(&mut writer, &TrackLine::Track(track.clone()))?;
        }
        writer.flush()?;
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum TrackLine {
    Header(TrackListHeader),
    Track(TrackRecord),
}

fn parse_line(raw: &str, line_no: usize, path: &Path) -> Result<TrackLine, DeckError> {
    serde_json::from_str(raw).map_err(|err| {
        DeckError::TrackFile(format!(
            "failed to parse line {} in {}: {}",
            line_no,
            path.display(),
            err
        ))
    })
}

fn write_line<W: Write>(writer: &mut W, line: &TrackLine) -> Result<(), DeckError> {
    serde_json::to_writer(&mut *writer, line)
        .map_err(|err| DeckError::TrackFile(format!("failed to serialize track list: {err}")))?;
    writer.write_all(b"\n")?;
    Ok(())
}
