//! Where track records come from.

mod oauth;
mod spotify;

pub use oauth::{
    CachedToken, DEFAULT_REDIRECT_URI, DEFAULT_TOKEN_CACHE, LIBRARY_SCOPE, UserAuth,
    listen_address, wait_for_code,
};
pub use spotify::{SpotifyClient, playlist_id};

use log::info;

use crate::error::{DeckError, FetchError};
use crate::track::TrackRecord;

/// Supplies ordered track records for a playlist reference.
pub trait TrackSource {
    /// Up to `count` playable tracks of the playlist, in playlist order,
    /// skipping tracks below `min_popularity`.
    fn playlist_tracks(
        &self,
        playlist: &str,
        count: usize,
        min_popularity: u32,
    ) -> Result<Vec<TrackRecord>, FetchError>;
}

/// Label given to the owner of the `index`-th playlist (zero-based).
pub fn player_label(index: usize) -> String {
    format!("Player {}", index + 1)
}

/// Fetch every playlist in order, tagging records with their player label.
///
/// Any fetch failure aborts the whole run. An empty combined result is a
/// layout error since there would be nothing to print.
pub fn fetch_playlists<S: TrackSource + ?Sized>(
    source: &S,
    playlists: &[String],
    count: usize,
    min_popularity: u32,
) -> Result<Vec<TrackRecord>, DeckError> {
    let mut all = Vec::new();
    for (idx, playlist) in playlists.iter().enumerate() {
        info!("fetching playlist {}/{}: {}", idx + 1, playlists.len(), playlist);
        let tracks = source.playlist_tracks(playlist, count, min_popularity)?;
        info!("  fetched {} track(s)", tracks.len());
        let label = player_label(idx);
        all.extend(tracks.into_iter().map(|mut track| {
            track.player = Some(label.clone());
            track
        }));
    }
    if all.is_empty() {
        return Err(DeckError::layout(
            "no tracks fetched; check the playlist references",
        ));
    }
    Ok(all)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    struct FakeSource {
        playlists: HashMap<&'static str, Vec<TrackRecord>>,
    }

    impl TrackSource for FakeSource {
        fn playlist_tracks(
            &self,
            playlist: &str,
            count: usize,
            min_popularity: u32,
        ) -> Result<Vec<TrackRecord>, FetchError> {
            let tracks = self
                .playlists
                .get(playlist)
                .ok_or_else(|| FetchError::NotFound(playlist.to_string()))?;
            Ok(tracks
                .iter()
                .filter(|t| t.popularity >= min_popularity)
                .take(count)
                .cloned()
                .collect())
        }
    }

    fn track(title: &str, popularity: u32) -> TrackRecord {
        let mut t = TrackRecord::new(title, "Artist", "2000", format!("https://x/{title}"));
        t.popularity = popularity;
        t
    }

    fn source() -> FakeSource {
        let mut playlists = HashMap::new();
        playlists.insert("a", vec![track("a1", 90), track("a2", 10), track("a3", 70)]);
        playlists.insert("b", vec![track("b1", 50)]);
        playlists.insert("empty", vec![]);
        FakeSource { playlists }
    }

    #[test]
    fn labels_players_in_playlist_order() -> anyhow::Result<()> {
        let refs = vec!["a".to_string(), "b".to_string()];
        let tracks = fetch_playlists(&source(), &refs, 10, 0)?;
        let labels: Vec<(&str, &str)> = tracks
            .iter()
            .map(|t| (t.title.as_str(), t.player.as_deref().unwrap_or("")))
            .collect();
        assert_eq!(
            labels,
            vec![
                ("a1", "Player 1"),
                ("a2", "Player 1"),
                ("a3", "Player 1"),
                ("b1", "Player 2"),
            ]
        );
        Ok(())
    }

    #[test]
    fn passes_count_and_popularity_through() -> anyhow::Result<()> {
        let refs = vec!["a".to_string()];
        let tracks = fetch_playlists(&source(), &refs, 1, 60)?;
        assert_eq!(tracks.len(), 1);
        assert_eq!(tracks[0].title, "a1");
        Ok(())
    }

    #[test]
    fn any_failure_aborts() {
        let refs = vec!["a".to_string(), "missing".to_string()];
        let err = fetch_playlists(&source(), &refs, 10, 0).unwrap_err();
        assert!(matches!(err, DeckError::Fetch(FetchError::NotFound(_))));
    }

    #[test]
    fn nothing_fetched_is_rejected() {
        let refs = vec!["empty".to_string()];
        assert!(matches!(
            fetch_playlists(&source(), &refs, 10, 0),
            Err(DeckError::Layout(_))
        ));
    }
}
