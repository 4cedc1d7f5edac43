use std::time::Duration;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use log::debug;
use serde::Deserialize;
use serde::de::DeserializeOwned;

use super::TrackSource;
use crate::config::Credentials;
use crate::error::FetchError;
use crate::library::LikedTrack;
use crate::track::TrackRecord;

pub(super) const TOKEN_URL: &str = "https://accounts.spotify.com/api/token";
const API_BASE: &str = "https://api.spotify.com/v1";
const PLAYLIST_PAGE_LIMIT: usize = 100;
const SAVED_PAGE_LIMIT: usize = 50;

/// Blocking client for the Spotify Web API.
pub struct SpotifyClient {
    agent: ureq::Agent,
    token: String,
}

impl std::fmt::Debug for SpotifyClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpotifyClient").finish_non_exhaustive()
    }
}

impl SpotifyClient {
    /// Exchange client credentials for an app access token.
    pub fn connect(credentials: &Credentials) -> Result<Self, FetchError> {
        let agent = build_agent();
        let response = agent
            .post(TOKEN_URL)
            .set("Authorization", &basic_auth(credentials))
            .send_form(&[("grant_type", "client_credentials")])
            .map_err(|err| match err {
                // the token endpoint answers bad credentials with 400
                ureq::Error::Status(400, _) => {
                    FetchError::Auth("client credentials were rejected".to_string())
                }
                other => map_error(other, "token request"),
            })?;
        let token: TokenResponse = decode(response)?;
        Ok(Self {
            agent,
            token: token.access_token,
        })
    }

    /// Use an already issued access token, e.g. a user token for library access.
    pub fn with_token<S: Into<String>>(token: S) -> Self {
        Self {
            agent: build_agent(),
            token: token.into(),
        }
    }

    /// Every saved ("liked") track of the token's user with popularity at
    /// least `min_popularity`, in library order.
    pub fn saved_tracks(&self, min_popularity: u32) -> Result<Vec<LikedTrack>, FetchError> {
        let mut liked = Vec::new();
        let mut next = Some(format!("{API_BASE}/me/tracks?limit={SAVED_PAGE_LIMIT}"));
        while let Some(url) = next {
            debug!("GET {url}");
            let page: Page<SavedItem> = self.get_json(&url, "saved tracks")?;
            liked.extend(
                page.items
                    .into_iter()
                    .filter_map(|item| item.track)
                    .filter(|track| track.popularity >= min_popularity)
                    .filter_map(ApiTrack::into_liked),
            );
            next = page.next;
        }
        Ok(liked)
    }

    fn get_json<T: DeserializeOwned>(&self, url: &str, context: &str) -> Result<T, FetchError> {
        let response = self
            .agent
            .get(url)
            .set("Authorization", &format!("Bearer {}", self.token))
            .call()
            .map_err(|err| map_error(err, context))?;
        decode(response)
    }
}

impl TrackSource for SpotifyClient {
    fn playlist_tracks(
        &self,
        playlist: &str,
        count: usize,
        min_popularity: u32,
    ) -> Result<Vec<TrackRecord>, FetchError> {
        let id = playlist_id(playlist);
        if id.is_empty() {
            return Err(FetchError::NotFound(playlist.to_string()));
        }
        let mut tracks = Vec::new();
        let mut offset = 0;
        while tracks.len() < count {
            let limit = PLAYLIST_PAGE_LIMIT.min(count - tracks.len());
            let url = format!("{API_BASE}/playlists/{id}/tracks?offset={offset}&limit={limit}");
            debug!("GET {url}");
            let page: Page<PlaylistItem> = self.get_json(&url, playlist).map_err(|err| match err {
                FetchError::NotFound(_) => FetchError::NotFound(playlist.to_string()),
                other => other,
            })?;
            if page.items.is_empty() {
                break;
            }
            offset += page.items.len();
            let has_next = page.next.is_some();
            tracks.extend(playable_tracks(page.items, min_popularity));
            if !has_next {
                break;
            }
        }
        tracks.truncate(count);
        Ok(tracks)
    }
}

/// Extract the playlist id from a web URL, a `spotify:playlist:` URI or a bare id.
pub fn playlist_id(reference: &str) -> &str {
    let reference = reference.trim();
    if let Some((_, rest)) = reference.split_once("/playlist/") {
        return rest.split(['?', '/', '#']).next().unwrap_or_default();
    }
    reference
        .strip_prefix("spotify:playlist:")
        .unwrap_or(reference)
}

/// `Authorization` header value for the token endpoint.
pub(super) fn basic_auth(credentials: &Credentials) -> String {
    let pair = format!("{}:{}", credentials.client_id, credentials.client_secret);
    format!("Basic {}", STANDARD.encode(pair))
}

pub(super) fn build_agent() -> ureq::Agent {
    ureq::AgentBuilder::new()
        .timeout(Duration::from_secs(30))
        .build()
}

pub(super) fn decode<T: DeserializeOwned>(response: ureq::Response) -> Result<T, FetchError> {
    response
        .into_json()
        .map_err(|err| FetchError::Decode(err.to_string()))
}

pub(super) fn map_error(err: ureq::Error, context: &str) -> FetchError {
    match err {
        ureq::Error::Status(401 | 403, response) => FetchError::Auth(format!(
            "{context}: HTTP {} {}",
            response.status(),
            response.status_text()
        )),
        ureq::Error::Status(404, _) => FetchError::NotFound(context.to_string()),
        ureq::Error::Status(429, response) => FetchError::RateLimited {
            retry_after: response
                .header("Retry-After")
                .and_then(|value| value.trim().parse().ok()),
        },
        ureq::Error::Status(code, _) => FetchError::Network(format!("{context}: HTTP {code}")),
        ureq::Error::Transport(transport) => FetchError::Network(transport.to_string()),
    }
}

fn playable_tracks(items: Vec<PlaylistItem>, min_popularity: u32) -> Vec<TrackRecord> {
    items
        .into_iter()
        .filter_map(|item| item.track)
        .filter(|track| track.popularity >= min_popularity)
        .filter_map(ApiTrack::into_record)
        .collect()
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct Page<T> {
    items: Vec<T>,
    #[serde(default)]
    next: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PlaylistItem {
    #[serde(default)]
    track: Option<ApiTrack>,
}

#[derive(Debug, Deserialize)]
struct SavedItem {
    #[serde(default)]
    track: Option<ApiTrack>,
}

#[derive(Debug, Deserialize)]
struct ApiTrack {
    name: String,
    #[serde(default)]
    artists: Vec<ApiArtist>,
    #[serde(default)]
    album: Option<ApiAlbum>,
    #[serde(default)]
    external_urls: ExternalUrls,
    #[serde(default)]
    popularity: u32,
}

#[derive(Debug, Deserialize)]
struct ApiArtist {
    name: String,
}

#[derive(Debug, Deserialize)]
struct ApiAlbum {
    #[serde(default)]
    name: String,
    #[serde(default)]
    release_date: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ExternalUrls {
    #[serde(default)]
    spotify: Option<String>,
}

impl ApiTrack {
    fn artist_names(&self) -> String {
        self.artists
            .iter()
            .map(|artist| artist.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn year(&self) -> String {
        TrackRecord::year_from_release_date(
            self.album.as_ref().and_then(|album| album.release_date.as_deref()),
        )
    }

    /// `None` for tracks without a web link (local files, unavailable items).
    fn url(&self) -> Option<String> {
        self.external_urls
            .spotify
            .clone()
            .filter(|url| !url.trim().is_empty())
    }

    fn into_record(self) -> Option<TrackRecord> {
        let url = self.url()?;
        let mut record = TrackRecord::new(self.name.clone(), self.artist_names(), self.year(), url);
        record.popularity = self.popularity;
        Some(record)
    }

    fn into_liked(self) -> Option<LikedTrack> {
        let url = self.url()?;
        Some(LikedTrack {
            artist: self.artist_names(),
            year: self.year(),
            album: self.album.map(|album| album.name).unwrap_or_default(),
            name: self.name,
            popularity: self.popularity,
            url,
        })
    }
}
