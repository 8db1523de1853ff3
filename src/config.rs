use anyhow::{Context, Result};

const DEFAULT_REDIRECT_URI: &str = "http://localhost:8888/callback";

/// Configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub resend: Option<ResendConfig>,
}

/// Settings for e-mail notifications through Resend
#[derive(Debug, Clone)]
pub struct ResendConfig {
    pub api_key: String,
    pub from_email: String,
    pub to_email: String,
}

/// Load configuration from `.env` and environment
pub fn load_config() -> Result<Config> {
    // Load `.env` file if present
    dotenv::dotenv().ok();

    let client_id = std::env::var("SPOTIFY_CLIENT_ID").context(
        "Spotify credentials not configured. Please set SPOTIFY_CLIENT_ID and SPOTIFY_CLIENT_SECRET",
    )?;
    let client_secret = std::env::var("SPOTIFY_CLIENT_SECRET").context(
        "Spotify credentials not configured. Please set SPOTIFY_CLIENT_ID and SPOTIFY_CLIENT_SECRET",
    )?;
    let redirect_uri = optional_var("SPOTIFY_REDIRECT_URI")
        .unwrap_or_else(|| DEFAULT_REDIRECT_URI.to_string());

    let resend = match (
        optional_var("RESEND_API_KEY"),
        optional_var("RESEND_FROM_EMAIL"),
        optional_var("RESEND_NOTIFICATION_EMAIL"),
    ) {
        (Some(api_key), Some(from_email), Some(to_email)) => Some(ResendConfig {
            api_key,
            from_email,
            to_email,
        }),
        _ => None,
    };

    Ok(Config {
        client_id,
        client_secret,
        redirect_uri,
        access_token: optional_var("SPOTIFY_ACCESS_TOKEN"),
        refresh_token: optional_var("SPOTIFY_REFRESH_TOKEN"),
        resend,
    })
}

/// Read a variable, treating unset and blank the same
fn optional_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
