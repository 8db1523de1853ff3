use crate::config::Config;
use crate::models::{CreatedPlaylist, CurrentUser, SavedTracksPage, TokenResponse, Track};
use crate::services::{Publisher, TrackSource};
use anyhow::{Context, Result};
use log::{debug, info, warn};
use serde::de::DeserializeOwned;
use std::cell::RefCell;
use std::collections::HashSet;
use std::time::Duration;
use ureq::{Agent, AgentBuilder};
use urlencoding::encode;

const API_BASE_URL: &str = "https://api.spotify.com/v1";
const ACCOUNTS_BASE_URL: &str = "https://accounts.spotify.com";
const AUTH_STATE: &str = "ritual-playlist-generator";
const PAGE_LIMIT: usize = 50; // Spotify allows 1-50 saved tracks per request
const MAX_URIS_PER_REQUEST: usize = 100;
const MAX_PAGES: usize = 1000;

const SCOPES: &[&str] = &[
    "user-library-read",
    "playlist-modify-public",
    "playlist-modify-private",
    "user-read-private",
    "user-read-email",
];

/// A minimal Spotify Web API client using bearer tokens
pub struct SpotifyClient {
    agent: Agent,
    client_id: String,
    client_secret: String,
    redirect_uri: String,
    access_token: RefCell<Option<String>>,
    refresh_token: RefCell<Option<String>>,
}

impl SpotifyClient {
    /// Create a new client with configuration from environment
    pub fn new(config: Config) -> Self {
        let agent = AgentBuilder::new().timeout(Duration::from_secs(10)).build();

        SpotifyClient {
            agent,
            client_id: config.client_id,
            client_secret: config.client_secret,
            redirect_uri: config.redirect_uri,
            access_token: RefCell::new(config.access_token),
            refresh_token: RefCell::new(config.refresh_token),
        }
    }

    /// URL the user visits to grant this application access
    pub fn auth_url(&self) -> String {
        format!(
            "{}/authorize?client_id={}&response_type=code&redirect_uri={}&scope={}&state={}",
            ACCOUNTS_BASE_URL,
            encode(&self.client_id),
            encode(&self.redirect_uri),
            encode(&SCOPES.join(" ")),
            AUTH_STATE
        )
    }

    /// Exchange an authorization code for access and refresh tokens
    pub fn exchange_code_for_tokens(&self, code: &str) -> Result<TokenResponse> {
        let tokens: TokenResponse = self
            .agent
            .post(&format!("{ACCOUNTS_BASE_URL}/api/token"))
            .send_form(&[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("redirect_uri", self.redirect_uri.as_str()),
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
            ])
            .map_err(|e| anyhow::anyhow!("Failed to exchange code for tokens: {}", e))?
            .into_json()
            .context("Failed to parse token response")?;

        *self.access_token.borrow_mut() = Some(tokens.access_token.clone());
        if let Some(refresh) = &tokens.refresh_token {
            *self.refresh_token.borrow_mut() = Some(refresh.clone());
        }

        Ok(tokens)
    }

    /// Obtain a fresh access token using the stored refresh token
    pub fn refresh_access_token(&self) -> Result<()> {
        let refresh_token = self
            .refresh_token
            .borrow()
            .clone()
            .ok_or_else(|| anyhow::anyhow!("No refresh token available"))?;

        let tokens: TokenResponse = self
            .agent
            .post(&format!("{ACCOUNTS_BASE_URL}/api/token"))
            .send_form(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", refresh_token.as_str()),
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
            ])
            .map_err(|e| anyhow::anyhow!("Failed to refresh access token: {}", e))?
            .into_json()
            .context("Failed to parse token refresh response")?;

        *self.access_token.borrow_mut() = Some(tokens.access_token);
        if let Some(refresh) = tokens.refresh_token {
            *self.refresh_token.borrow_mut() = Some(refresh);
        }

        info!("Access token refreshed successfully");
        Ok(())
    }

    /// Make sure the stored tokens work, refreshing them if they have expired
    pub fn authenticate(&self) -> Result<()> {
        let has_tokens =
            self.access_token.borrow().is_some() && self.refresh_token.borrow().is_some();

        if !has_tokens {
            return Err(anyhow::anyhow!(
                "Spotify authentication required!\n\n\
                 To authenticate with Spotify:\n\
                 1. Visit this URL: {}\n\
                 2. Authorize the application\n\
                 3. Set SPOTIFY_ACCESS_TOKEN and SPOTIFY_REFRESH_TOKEN from the authorization flow\n\n\
                 Or run the app with --auth to start the authentication flow.",
                self.auth_url()
            ));
        }

        match self.call_api("GET", "/me", &[], None) {
            Ok(_) => {
                info!("Using existing access token");
                Ok(())
            }
            Err(e) => {
                debug!("Token probe failed: {e}");
                info!("Access token expired, attempting refresh...");
                self.refresh_access_token()
            }
        }
    }

    /// Send a single request with the current bearer token
    fn call_api(
        &self,
        method: &str,
        path: &str,
        query: &[(&str, String)],
        body: Option<&serde_json::Value>,
    ) -> Result<ureq::Response, ureq::Error> {
        let token = self.access_token.borrow().clone().unwrap_or_default();

        let mut request = self
            .agent
            .request(method, &format!("{API_BASE_URL}{path}"))
            .set("Authorization", &format!("Bearer {token}"))
            .set("Accept", "application/json");

        for (key, value) in query {
            request = request.query(key, value);
        }

        match body {
            Some(json) => request.send_json(json),
            None => request.call(),
        }
    }

    /// Send a request and parse the JSON body, refreshing the token once on 401
    fn api_request<T: DeserializeOwned>(
        &self,
        method: &str,
        path: &str,
        query: &[(&str, String)],
        body: Option<&serde_json::Value>,
    ) -> Result<T> {
        let can_refresh = self.refresh_token.borrow().is_some();

        let response = match self.call_api(method, path, query, body) {
            Err(ureq::Error::Status(401, _)) if can_refresh => {
                info!("Access token rejected, attempting refresh...");
                self.refresh_access_token()?;
                self.call_api(method, path, query, body)
            }
            other => other,
        }
        .map_err(|e| Self::describe_error(path, e))?;

        response
            .into_json::<T>()
            .with_context(|| format!("Failed to parse JSON response from {path}"))
    }

    fn describe_error(path: &str, error: ureq::Error) -> anyhow::Error {
        match error {
            ureq::Error::Status(400, _) => {
                anyhow::anyhow!("Bad request - check your Spotify app permissions and scopes")
            }
            ureq::Error::Status(401, _) => {
                anyhow::anyhow!("Unauthorized - your access token may be invalid")
            }
            ureq::Error::Status(403, _) => {
                anyhow::anyhow!("Forbidden - check your Spotify app has the required scopes")
            }
            ureq::Error::Status(code, response) => {
                let body = response.into_string().unwrap_or_default();
                anyhow::anyhow!("Spotify API returned status {} for {}: {}", code, path, body)
            }
            ureq::Error::Transport(transport) => {
                anyhow::anyhow!("HTTP request to {} failed: {}", path, transport)
            }
        }
    }

    /// Fetch one page of the user's saved tracks
    pub fn get_liked_songs(&self, limit: usize, offset: usize) -> Result<SavedTracksPage> {
        let limit = limit.clamp(1, PAGE_LIMIT);
        debug!("Fetching liked songs: limit={limit}, offset={offset}");

        self.api_request(
            "GET",
            "/me/tracks",
            &[("limit", limit.to_string()), ("offset", offset.to_string())],
            None,
        )
        .context("Failed to fetch liked songs")
    }

    /// Fetch every saved track, page by page
    pub fn get_all_liked_songs(&self) -> Result<Vec<Track>> {
        let mut all_tracks = Vec::new();
        let mut seen_ids = HashSet::new();
        let mut offset = 0;

        for _ in 0..MAX_PAGES {
            let page = self.get_liked_songs(PAGE_LIMIT, offset)?;
            let page_len = page.items.len();

            for track in page.items.into_iter().filter_map(|item| item.track) {
                if seen_ids.insert(track.id.clone()) {
                    all_tracks.push(track);
                }
            }

            if page_len < PAGE_LIMIT || page.next.is_none() {
                break;
            }
            offset += PAGE_LIMIT;
        }

        if all_tracks.is_empty() {
            warn!("No liked songs found in your Spotify library");
            info!("Tip: Like some songs in Spotify first, then try again");
        } else {
            info!("Found {} liked songs", all_tracks.len());
        }

        Ok(all_tracks)
    }

    /// Create an empty private playlist for the current user
    pub fn create_user_playlist(&self, name: &str, description: &str) -> Result<String> {
        let user: CurrentUser = self
            .api_request("GET", "/me", &[], None)
            .context("Failed to look up current user")?;

        let body = serde_json::json!({
            "name": name,
            "description": description,
            "public": false,
        });

        let created: CreatedPlaylist = self
            .api_request("POST", &format!("/users/{}/playlists", encode(&user.id)), &[], Some(&body))
            .context("Failed to create playlist")?;

        info!("Created playlist '{}' (ID: {})", created.name, created.id);
        Ok(created.id)
    }

    /// Append tracks to a playlist, at most 100 per request
    pub fn add_tracks_to_playlist(&self, playlist_id: &str, track_uris: &[String]) -> Result<()> {
        let path = format!("/playlists/{}/tracks", encode(playlist_id));

        for chunk in track_uris.chunks(MAX_URIS_PER_REQUEST) {
            let body = serde_json::json!({ "uris": chunk });
            let _: serde_json::Value = self
                .api_request("POST", &path, &[], Some(&body))
                .context("Failed to add tracks to playlist")?;
            debug!("Added {} tracks to playlist {}", chunk.len(), playlist_id);
        }

        Ok(())
    }
}

impl TrackSource for SpotifyClient {
    fn fetch_all_tracks(&self) -> Result<Vec<Track>> {
        self.get_all_liked_songs()
    }
}

impl Publisher for SpotifyClient {
    fn create_playlist(&self, name: &str, description: &str) -> Result<String> {
        self.create_user_playlist(name, description)
    }

    fn add_tracks(&self, playlist_id: &str, track_uris: &[String]) -> Result<()> {
        self.add_tracks_to_playlist(playlist_id, track_uris)
    }
}

/// Pull the authorization code out of a pasted redirect URL, or accept a bare code
pub fn parse_authorization_code(input: &str) -> Result<String> {
    let input = input.trim();

    if let Some(error) = query_param(input, "error") {
        return Err(anyhow::anyhow!("Authorization error: {}", error));
    }

    if let Some(code) = query_param(input, "code") {
        return Ok(code);
    }

    if input.is_empty() || input.contains(['?', '&', '=', ' ']) {
        return Err(anyhow::anyhow!("No authorization code found in '{}'", input));
    }

    Ok(input.to_string())
}

fn query_param(url: &str, name: &str) -> Option<String> {
    let (_, query) = url.split_once('?')?;
    query
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| {
            urlencoding::decode(value)
                .map(|decoded| decoded.into_owned())
                .unwrap_or_else(|_| value.to_string())
        })
}
