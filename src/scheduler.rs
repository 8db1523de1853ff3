use crate::playlist::utils::{PlaylistNaming, format_duration, rounded_minutes};
use crate::playlist::{GeneratedPlaylist, PlaylistConfig, PlaylistGenerator};
use crate::services::{Notifier, Publisher, TrackSource};
use anyhow::Result;
use chrono::{Local, NaiveDateTime, NaiveTime};
use log::{debug, error, info};
use rand::Rng;
use std::time::Duration;

const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(60);

/// What a single run produced
#[derive(Debug)]
pub struct RunOutcome {
    pub playlist: GeneratedPlaylist,
    pub playlist_id: Option<String>, // None when publishing was skipped
}

/// Drives fetch, assembly, publishing and notification, once or every day
pub struct RitualScheduler<'a> {
    source: &'a dyn TrackSource,
    publisher: &'a dyn Publisher,
    notifier: &'a dyn Notifier,
    generator: PlaylistGenerator,
    debug: bool,
}

impl<'a> RitualScheduler<'a> {
    pub fn new(
        source: &'a dyn TrackSource,
        publisher: &'a dyn Publisher,
        notifier: &'a dyn Notifier,
        playlist_config: PlaylistConfig,
    ) -> Self {
        Self {
            source,
            publisher,
            notifier,
            generator: PlaylistGenerator::new(playlist_config),
            debug: false,
        }
    }

    /// Print the playlist instead of publishing it
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// One full run. Any failure aborts the remaining steps; an already
    /// created remote playlist is left as-is.
    pub fn create_daily_playlist<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<RunOutcome> {
        info!("Starting ritual playlist generation...");

        let pool = self.source.fetch_all_tracks()?;
        let name = PlaylistNaming::dated_name(&self.generator.config().name);
        let playlist = self.generator.generate_playlist(&pool, name, rng)?;

        info!("Generated playlist: {}", playlist.name);
        info!(
            "Total duration: {} minutes",
            rounded_minutes(playlist.total_duration_ms)
        );
        info!("Total tracks: {}", playlist.tracks.len());

        if self.debug {
            print_playlist(&playlist);
            return Ok(RunOutcome {
                playlist,
                playlist_id: None,
            });
        }

        let description = PlaylistNaming::phase_summary(&playlist);
        let playlist_id = self.publisher.create_playlist(&playlist.name, &description)?;
        self.publisher
            .add_tracks(&playlist_id, &playlist.track_uris())?;

        info!("Successfully created playlist with ID: {playlist_id}");
        info!("Phase breakdown:");
        for phase in &playlist.phase_breakdown {
            info!(
                "   {}: {} tracks, {}min",
                phase.phase,
                phase.tracks.len(),
                rounded_minutes(phase.duration_ms)
            );
        }

        self.notifier.notify(&playlist, &playlist_id);

        Ok(RunOutcome {
            playlist,
            playlist_id: Some(playlist_id),
        })
    }

    /// Alias used by the `--once` flag
    pub fn run_once<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<RunOutcome> {
        info!("Running ritual playlist generation once...");
        self.create_daily_playlist(rng)
    }

    /// Run every day at `hour:minute` local time. Failed runs are logged and
    /// the schedule carries on; this only returns on an invalid time.
    pub fn run_daily<R: Rng + ?Sized>(&self, hour: u32, minute: u32, rng: &mut R) -> Result<()> {
        let run_time = NaiveTime::from_hms_opt(hour, minute, 0)
            .ok_or_else(|| anyhow::anyhow!("Invalid schedule time {}:{:02}", hour, minute))?;

        info!("Scheduling daily ritual playlist creation at {hour}:{minute:02}");

        loop {
            let next_run = next_run_after(Local::now().naive_local(), run_time);
            info!("Next run at {}", next_run.format("%Y-%m-%d %H:%M"));
            sleep_until(next_run);

            info!(
                "Daily ritual playlist creation triggered at {}",
                Local::now().format("%Y-%m-%d %H:%M:%S")
            );
            if let Err(e) = self.create_daily_playlist(rng) {
                error!("Scheduled playlist creation failed: {e:#}");
            }
        }
    }
}

/// The first occurrence of `run_time` strictly after `now`
pub fn next_run_after(now: NaiveDateTime, run_time: NaiveTime) -> NaiveDateTime {
    let today = now.date().and_time(run_time);
    if today > now {
        today
    } else {
        today + chrono::Duration::days(1)
    }
}

fn sleep_until(target: NaiveDateTime) {
    loop {
        let now = Local::now().naive_local();
        let Ok(remaining) = (target - now).to_std() else {
            return;
        };
        if remaining.is_zero() {
            return;
        }
        debug!("Scheduler status: Running, next run in {}s", remaining.as_secs());
        std::thread::sleep(remaining.min(HEARTBEAT_INTERVAL));
    }
}

/// Dump the playlist to stdout for `--debug` runs
pub fn print_playlist(playlist: &GeneratedPlaylist) {
    println!("\nDEBUG MODE: Playlist '{}' (would create via API)", playlist.name);
    println!(
        "   Tracks: {} | Duration: {}",
        playlist.tracks.len(),
        format_duration(playlist.total_duration_ms)
    );
    println!("   Description: {}", PlaylistNaming::phase_summary(playlist));

    let mut position = 1;
    for phase in &playlist.phase_breakdown {
        println!(
            "\n   {} ({} tracks, {})",
            phase.phase,
            phase.tracks.len(),
            format_duration(phase.duration_ms)
        );
        for track in &phase.tracks {
            println!(
                "     {}. \"{}\" by {} {}",
                position,
                track.name,
                track.artist_names(),
                format_duration(track.duration_ms)
            );
            println!("        URI: {}", track.uri);
            position += 1;
        }
    }
}
