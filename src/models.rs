use serde::{Deserialize, Serialize};

/// A saved track with the fields available from the Spotify Web API
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Track {
    pub id: String,
    pub name: String,
    pub artists: Vec<Artist>,
    pub duration_ms: u64,
    pub uri: String,
    #[serde(default)]
    pub external_urls: Option<ExternalUrls>,
    #[serde(default)]
    pub audio_features: Option<AudioFeatures>, // Only present when fetched separately
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Artist {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExternalUrls {
    pub spotify: Option<String>,
}

/// Audio analysis attributes. Nothing in phase selection reads these yet.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AudioFeatures {
    pub danceability: f32,
    pub energy: f32,
    pub key: i32,
    pub loudness: f32,
    pub mode: i32,
    pub speechiness: f32,
    pub acousticness: f32,
    pub instrumentalness: f32,
    pub liveness: f32,
    pub valence: f32,
    pub tempo: f32,
    pub duration_ms: u64,
    pub time_signature: i32,
}

impl Track {
    /// Lower-cased "name artist1 artist2 ..." text used for keyword matching
    pub fn search_text(&self) -> String {
        let artist_names: Vec<&str> = self.artists.iter().map(|a| a.name.as_str()).collect();
        format!("{} {}", self.name, artist_names.join(" ")).to_lowercase()
    }

    /// Comma separated artist names for display
    pub fn artist_names(&self) -> String {
        self.artists
            .iter()
            .map(|a| a.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl Default for Track {
    fn default() -> Self {
        Track {
            id: String::new(),
            name: "Unknown".to_string(),
            artists: Vec::new(),
            duration_ms: 0,
            uri: String::new(),
            external_urls: None,
            audio_features: None,
        }
    }
}

/// One page of the `GET /me/tracks` response
#[derive(Debug, Deserialize)]
pub struct SavedTracksPage {
    pub items: Vec<SavedTrackItem>,
    pub next: Option<String>,
    pub total: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct SavedTrackItem {
    pub added_at: Option<String>,
    pub track: Option<Track>,
}

/// Response of `GET /me`
#[derive(Debug, Deserialize)]
pub struct CurrentUser {
    pub id: String,
    pub display_name: Option<String>,
}

/// Response of `POST /users/{id}/playlists`
#[derive(Debug, Deserialize)]
pub struct CreatedPlaylist {
    pub id: String,
    pub name: String,
}

/// Response of the accounts service token endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_in: u64,
    pub token_type: String,
}
