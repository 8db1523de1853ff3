use crate::config::ResendConfig;
use crate::playlist::GeneratedPlaylist;
use crate::playlist::utils::rounded_minutes;
use crate::services::Notifier;
use anyhow::Result;
use log::{error, info};
use std::cell::Cell;
use std::time::Duration;
use ureq::{Agent, AgentBuilder};

const RESEND_EMAILS_URL: &str = "https://api.resend.com/emails";

/// Public link to a playlist on Spotify
pub fn playlist_url(playlist_id: &str) -> String {
    format!("https://open.spotify.com/playlist/{playlist_id}")
}

/// Sends a summary e-mail through Resend when a playlist has been published
pub struct NotificationService {
    agent: Agent,
    resend: Option<ResendConfig>,
    config_warning_logged: Cell<bool>,
}

impl NotificationService {
    pub fn new(resend: Option<ResendConfig>) -> Self {
        Self {
            agent: AgentBuilder::new().timeout(Duration::from_secs(10)).build(),
            resend,
            config_warning_logged: Cell::new(false),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.resend.is_some()
    }

    pub fn subject(playlist: &GeneratedPlaylist) -> String {
        format!("New Ritual Playlist: {}", playlist.name)
    }

    /// Plain text body of the notification
    pub fn text_body(playlist: &GeneratedPlaylist, playlist_id: &str) -> String {
        let mut lines = vec![
            "New Ritual Playlist Created!".to_string(),
            format!("Name: {}", playlist.name),
            format!("Tracks: {}", playlist.tracks.len()),
            format!(
                "Total Duration: {} minutes",
                rounded_minutes(playlist.total_duration_ms)
            ),
            String::new(),
            "Phase Breakdown:".to_string(),
        ];

        for phase in &playlist.phase_breakdown {
            lines.push(format!(
                " - {}: {} tracks, {} minutes",
                phase.phase,
                phase.tracks.len(),
                rounded_minutes(phase.duration_ms)
            ));
        }

        lines.push(String::new());
        lines.push(format!("Open in Spotify: {}", playlist_url(playlist_id)));
        lines.join("\n")
    }

    /// HTML body with the phase breakdown as a table
    pub fn html_body(playlist: &GeneratedPlaylist, playlist_id: &str) -> String {
        let rows: String = playlist
            .phase_breakdown
            .iter()
            .map(|phase| {
                format!(
                    "<tr><td>{}</td><td>{}</td><td>{}</td></tr>",
                    escape_html(&phase.phase),
                    phase.tracks.len(),
                    rounded_minutes(phase.duration_ms)
                )
            })
            .collect();

        format!(
            "<div style=\"font-family:Arial, sans-serif;line-height:1.6;\">\
             <h2>New Ritual Playlist Created!</h2>\
             <p><strong>Name:</strong> {}<br/><strong>Tracks:</strong> {}<br/>\
             <strong>Total Duration:</strong> {} minutes</p>\
             <p><a href=\"{}\">Open in Spotify</a></p>\
             <h3>Phase Breakdown</h3>\
             <table><thead><tr><th>Phase</th><th>Tracks</th><th>Minutes</th></tr></thead>\
             <tbody>{}</tbody></table></div>",
            escape_html(&playlist.name),
            playlist.tracks.len(),
            rounded_minutes(playlist.total_duration_ms),
            playlist_url(playlist_id),
            rows
        )
    }

    fn send(&self, resend: &ResendConfig, playlist: &GeneratedPlaylist, playlist_id: &str) -> Result<()> {
        let body = serde_json::json!({
            "from": resend.from_email,
            "to": resend.to_email,
            "subject": Self::subject(playlist),
            "html": Self::html_body(playlist, playlist_id),
            "text": Self::text_body(playlist, playlist_id),
        });

        let response: serde_json::Value = self
            .agent
            .post(RESEND_EMAILS_URL)
            .set("Authorization", &format!("Bearer {}", resend.api_key))
            .send_json(&body)
            .map_err(|e| anyhow::anyhow!("Resend request failed: {}", e))?
            .into_json()?;

        info!(
            "Notification email sent via Resend (id: {})",
            response.get("id").and_then(|id| id.as_str()).unwrap_or("unknown")
        );
        Ok(())
    }
}

impl Notifier for NotificationService {
    fn notify(&self, playlist: &GeneratedPlaylist, playlist_id: &str) {
        let Some(resend) = &self.resend else {
            if !self.config_warning_logged.get() {
                info!(
                    "Email notifications disabled. Provide RESEND_API_KEY, RESEND_FROM_EMAIL, and RESEND_NOTIFICATION_EMAIL to enable."
                );
                self.config_warning_logged.set(true);
            }
            return;
        };

        info!(
            "Sending notification to {} for playlist {} ({} tracks)",
            resend.to_email,
            playlist_id,
            playlist.tracks.len()
        );

        if let Err(e) = self.send(resend, playlist, playlist_id) {
            error!("Failed to send notification email: {e}");
        }
    }
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
