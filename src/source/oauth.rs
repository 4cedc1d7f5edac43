//! Authorization-code sign-in for endpoints that act on behalf of a user.
//!
//! The user approves access in a browser, the service redirects to a
//! loopback address where a one-shot listener picks up the code, and the
//! resulting token is cached on disk and refreshed when it expires.

use std::fs;
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration as StdDuration;

use chrono::{DateTime, Duration, Utc};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::spotify::{TOKEN_URL, basic_auth, build_agent, decode, map_error};
use crate::config::Credentials;
use crate::error::{DeckError, FetchError};

const AUTHORIZE_URL: &str = "https://accounts.spotify.com/authorize";
/// Scope needed to read the user's saved tracks.
pub const LIBRARY_SCOPE: &str = "user-library-read";
pub const DEFAULT_REDIRECT_URI: &str = "http://127.0.0.1:8888";
pub const DEFAULT_TOKEN_CACHE: &str = ".spotify_cache";
/// Tokens this close to expiry are treated as expired.
const EXPIRY_MARGIN_SECS: i64 = 60;

/// User token as persisted between runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedToken {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// Space-separated scopes granted with the token.
    #[serde(default)]
    pub scope: String,
    pub expires_at: DateTime<Utc>,
}

impl CachedToken {
    /// Whether the token grants `scope` and stays valid for a while after `now`.
    pub fn is_usable(&self, now: DateTime<Utc>, scope: &str) -> bool {
        self.scope.split_whitespace().any(|granted| granted == scope)
            && self.expires_at - Duration::seconds(EXPIRY_MARGIN_SECS) > now
    }

    /// Read a cached token. A missing or unreadable cache yields `None`.
    pub fn load(path: &Path) -> Option<Self> {
        let contents = fs::read_to_string(path).ok()?;
        match serde_json::from_str(&contents) {
            Ok(token) => Some(token),
            Err(err) => {
                warn!("ignoring token cache {}: {}", path.display(), err);
                None
            }
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), DeckError> {
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::from)?;
        fs::write(path, json)?;
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct TokenGrant {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    scope: Option<String>,
    expires_in: i64,
}

impl TokenGrant {
    /// Refresh responses may omit the refresh token and scope; keep the old ones.
    fn into_cached(
        self,
        now: DateTime<Utc>,
        previous_refresh: Option<&str>,
        requested_scope: &str,
    ) -> CachedToken {
        CachedToken {
            access_token: self.access_token,
            refresh_token: self
                .refresh_token
                .or_else(|| previous_refresh.map(str::to_string)),
            scope: self.scope.unwrap_or_else(|| requested_scope.to_string()),
            expires_at: now + Duration::seconds(self.expires_in),
        }
    }
}

/// Obtains user access tokens through the authorization-code flow.
pub struct UserAuth {
    agent: ureq::Agent,
    credentials: Credentials,
    scope: String,
    redirect_uri: String,
    cache_path: PathBuf,
}

impl UserAuth {
    pub fn new(credentials: Credentials, scope: &str) -> Self {
        Self {
            agent: build_agent(),
            credentials,
            scope: scope.to_string(),
            redirect_uri: DEFAULT_REDIRECT_URI.to_string(),
            cache_path: PathBuf::from(DEFAULT_TOKEN_CACHE),
        }
    }

    pub fn with_redirect_uri<S: Into<String>>(mut self, redirect_uri: S) -> Self {
        self.redirect_uri = redirect_uri.into();
        self
    }

    pub fn with_cache_path<P: Into<PathBuf>>(mut self, cache_path: P) -> Self {
        self.cache_path = cache_path.into();
        self
    }

    /// Consent page the user has to open.
    pub fn authorize_url(&self, state: &str) -> String {
        self.agent
            .get(AUTHORIZE_URL)
            .query("client_id", &self.credentials.client_id)
            .query("response_type", "code")
            .query("redirect_uri", &self.redirect_uri)
            .query("scope", &self.scope)
            .query("state", state)
            .url()
            .to_string()
    }

    /// A usable access token: cached, refreshed, or freshly authorized.
    ///
    /// `show_url` receives the consent page URL when the browser step is needed.
    pub fn access_token<F: FnOnce(&str)>(&self, show_url: F) -> Result<String, DeckError> {
        if let Some(cached) = CachedToken::load(&self.cache_path) {
            if cached.is_usable(Utc::now(), &self.scope) {
                debug!("using cached token from {}", self.cache_path.display());
                return Ok(cached.access_token);
            }
            if let Some(refresh_token) = cached.refresh_token.as_deref() {
                match self.refresh(refresh_token) {
                    Ok(token) => {
                        info!("refreshed cached token");
                        token.save(&self.cache_path)?;
                        return Ok(token.access_token);
                    }
                    Err(err) => warn!("token refresh failed ({err}); signing in again"),
                }
            }
        }

        let address = listen_address(&self.redirect_uri)?;
        let listener = TcpListener::bind(&address)?;
        let state = new_state(&self.credentials.client_id);
        show_url(&self.authorize_url(&state));
        let code = wait_for_code(&listener, &state)?;
        let token = self.exchange_code(&code)?;
        token.save(&self.cache_path)?;
        debug!("cached token in {}", self.cache_path.display());
        Ok(token.access_token)
    }

    fn exchange_code(&self, code: &str) -> Result<CachedToken, FetchError> {
        self.request_token(
            &[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("redirect_uri", &self.redirect_uri),
            ],
            None,
        )
    }

    fn refresh(&self, refresh_token: &str) -> Result<CachedToken, FetchError> {
        self.request_token(
            &[
                ("grant_type", "refresh_token"),
                ("refresh_token", refresh_token),
            ],
            Some(refresh_token),
        )
    }

    fn request_token(
        &self,
        form: &[(&str, &str)],
        previous_refresh: Option<&str>,
    ) -> Result<CachedToken, FetchError> {
        let response = self
            .agent
            .post(TOKEN_URL)
            .set("Authorization", &basic_auth(&self.credentials))
            .send_form(form)
            .map_err(|err| match err {
                ureq::Error::Status(400, _) => {
                    FetchError::Auth("authorization grant was rejected".to_string())
                }
                other => map_error(other, "token request"),
            })?;
        let grant: TokenGrant = decode(response)?;
        Ok(grant.into_cached(Utc::now(), previous_refresh, &self.scope))
    }
}

/// `host:port` to listen on for a plain-http loopback redirect URI.
pub fn listen_address(redirect_uri: &str) -> Result<String, DeckError> {
    let rest = redirect_uri.strip_prefix("http://").ok_or_else(|| {
        DeckError::Configuration(format!(
            "redirect URI {redirect_uri} must start with http://"
        ))
    })?;
    let authority = rest.split(['/', '?', '#']).next().unwrap_or_default();
    if authority.is_empty() {
        return Err(DeckError::Configuration(format!(
            "redirect URI {redirect_uri} has no host"
        )));
    }
    if authority.contains(':') {
        Ok(authority.to_string())
    } else {
        Ok(format!("{authority}:80"))
    }
}

/// What the browser brought back to the redirect listener.
#[derive(Debug, PartialEq, Eq)]
enum Callback {
    Code(String),
    Denied(String),
    /// Unrelated request such as `/favicon.ico`.
    Ignored,
}

fn parse_callback(target: &str, expected_state: &str) -> Callback {
    let Some((_, query)) = target.split_once('?') else {
        return Callback::Ignored;
    };
    let (mut code, mut state, mut error) = (None, None, None);
    for pair in query.split('&') {
        let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
        match key {
            "code" => code = Some(value),
            "state" => state = Some(value),
            "error" => error = Some(value),
            _ => {}
        }
    }
    if let Some(error) = error {
        return Callback::Denied(format!("authorization denied: {error}"));
    }
    match code {
        None => Callback::Ignored,
        Some(_) if state != Some(expected_state) => {
            Callback::Denied("state mismatch in authorization callback".to_string())
        }
        Some(code) => Callback::Code(code.to_string()),
    }
}

/// Serve redirect requests on `listener` until one carries the code.
pub fn wait_for_code(listener: &TcpListener, expected_state: &str) -> Result<String, DeckError> {
    loop {
        let (mut stream, _) = listener.accept()?;
        let _ = stream.set_read_timeout(Some(StdDuration::from_secs(5)));
        let mut buf = [0u8; 4096];
        let n = match stream.read(&mut buf) {
            Ok(n) => n,
            Err(err) => {
                debug!("dropping redirect connection: {err}");
                continue;
            }
        };
        let request = String::from_utf8_lossy(&buf[..n]);
        let target = request.split_whitespace().nth(1).unwrap_or("/");
        match parse_callback(target, expected_state) {
            Callback::Ignored => respond(&mut stream, "404 Not Found", "Not Found")?,
            Callback::Code(code) => {
                respond(&mut stream, "200 OK", "Signed in. You can close this window.")?;
                return Ok(code);
            }
            Callback::Denied(reason) => {
                respond(&mut stream, "400 Bad Request", "Sign-in failed.")?;
                return Err(FetchError::Auth(reason).into());
            }
        }
    }
}

fn respond(stream: &mut TcpStream, status: &str, body: &str) -> std::io::Result<()> {
    write!(
        stream,
        "HTTP/1.1 {status}\r\nContent-Type: text/plain; charset=utf-8\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    )?;
    stream.flush()
}

fn new_state(seed: &str) -> String {
    static ISSUED: AtomicU64 = AtomicU64::new(0);
    let mut hasher = Sha256::new();
    hasher.update(seed.as_bytes());
    hasher.update(ISSUED.fetch_add(1, Ordering::Relaxed).to_le_bytes());
    hasher.update(Utc::now().timestamp_nanos_opt().unwrap_or_default().to_le_bytes());
    hasher.update(std::process::id().to_le_bytes());
    let digest = format!("{:x}", hasher.finalize());
    digest[..32].to_string()
}
