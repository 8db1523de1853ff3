use super::GeneratedPlaylist;
use chrono::{Local, NaiveDate};

const MINUTE_MS: u64 = 60_000;

/// Whole minutes, rounding halves up
pub fn rounded_minutes(duration_ms: u64) -> u64 {
    (duration_ms + MINUTE_MS / 2) / MINUTE_MS
}

/// Playlist naming utilities
pub struct PlaylistNaming;

impl PlaylistNaming {
    /// "<base> - M/D/YYYY" for today's local date
    pub fn dated_name(base_name: &str) -> String {
        Self::name_for_date(base_name, Local::now().date_naive())
    }

    pub fn name_for_date(base_name: &str, date: NaiveDate) -> String {
        format!("{} - {}", base_name, date.format("%-m/%-d/%Y"))
    }

    /// Phase summary used as the published playlist description
    pub fn phase_summary(playlist: &GeneratedPlaylist) -> String {
        playlist
            .phase_breakdown
            .iter()
            .map(|phase| {
                format!(
                    "{}: {} tracks ({}min)",
                    phase.phase,
                    phase.tracks.len(),
                    rounded_minutes(phase.duration_ms)
                )
            })
            .collect::<Vec<_>>()
            .join(" | ")
    }
}

/// m:ss display for a millisecond duration
pub fn format_duration(duration_ms: u64) -> String {
    let seconds = duration_ms / 1000;
    format!("{}:{:02}", seconds / 60, seconds % 60)
}
