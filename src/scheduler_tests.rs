// Tests for the run pipeline: fetch, assemble, publish, notify

use crate::client::parse_authorization_code;
use crate::error::AssembleError;
use crate::models::{Artist, Track};
use crate::notification::{NotificationService, playlist_url};
use crate::playlist::utils::PlaylistNaming;
use crate::playlist::{GeneratedPlaylist, PhaseBreakdown, PlaylistConfig};
use crate::scheduler::{RitualScheduler, next_run_after};
use crate::services::{MockNotifier, MockPublisher, MockTrackSource, Notifier};

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime};
    use mockall::Sequence;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::sync::{Arc, Mutex};

    fn create_test_track(id: &str, name: &str, duration_ms: u64) -> Track {
        Track {
            id: id.to_string(),
            name: name.to_string(),
            artists: vec![Artist {
                id: None,
                name: format!("Artist {id}"),
            }],
            duration_ms,
            uri: format!("spotify:track:{id}"),
            ..Track::default()
        }
    }

    fn liked_songs() -> Vec<Track> {
        vec![
            create_test_track("1", "Temple Song", 180_000),
            create_test_track("2", "Dance Divine", 240_000),
            create_test_track("3", "Beast Unleashed", 200_000),
            create_test_track("4", "Warm Intro", 150_000),
            create_test_track("5", "Cool Down", 210_000),
            create_test_track("6", "Wild Mix", 190_000),
        ]
    }

    fn sample_playlist() -> GeneratedPlaylist {
        let intro = vec![
            create_test_track("a", "Warm Up", 200_000),
            create_test_track("b", "Rise", 190_000),
        ];
        let outro = vec![create_test_track("c", "Cool <Down>", 180_000)];
        let tracks: Vec<Track> = intro.iter().chain(outro.iter()).cloned().collect();

        GeneratedPlaylist {
            name: "The Ritual - 3/7/2025".to_string(),
            total_duration_ms: 570_000,
            tracks,
            phase_breakdown: vec![
                PhaseBreakdown::new("Intro".to_string(), intro),
                PhaseBreakdown::new("Outro & Stretch".to_string(), outro),
            ],
        }
    }

    #[test]
    fn test_empty_library_stops_before_publishing() {
        let mut source = MockTrackSource::new();
        source.expect_fetch_all_tracks().times(1).returning(|| Ok(vec![]));

        let mut publisher = MockPublisher::new();
        publisher.expect_create_playlist().times(0);
        publisher.expect_add_tracks().times(0);

        let mut notifier = MockNotifier::new();
        notifier.expect_notify().times(0);

        let scheduler =
            RitualScheduler::new(&source, &publisher, &notifier, PlaylistConfig::default());
        let err = scheduler
            .create_daily_playlist(&mut rand::thread_rng())
            .unwrap_err();

        assert_eq!(
            err.downcast_ref::<AssembleError>(),
            Some(&AssembleError::EmptyPool)
        );
        assert_eq!(err.to_string(), "No liked songs found");
    }

    #[test]
    fn test_successful_run_publishes_then_notifies() {
        let mut source = MockTrackSource::new();
        source
            .expect_fetch_all_tracks()
            .times(1)
            .returning(|| Ok(liked_songs()));

        let added_uris: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
        let captured = Arc::clone(&added_uris);

        let mut seq = Sequence::new();
        let mut publisher = MockPublisher::new();
        publisher
            .expect_create_playlist()
            .withf(|name: &str, description: &str| {
                name.starts_with("The Ritual - ") && description.contains(" tracks (")
            })
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok("playlist-123".to_string()));
        publisher
            .expect_add_tracks()
            .withf(|playlist_id: &str, uris: &[String]| playlist_id == "playlist-123" && !uris.is_empty())
            .times(1)
            .in_sequence(&mut seq)
            .returning(move |_, uris| {
                captured.lock().unwrap().extend(uris.iter().cloned());
                Ok(())
            });

        let mut notifier = MockNotifier::new();
        notifier
            .expect_notify()
            .withf(|playlist: &GeneratedPlaylist, playlist_id: &str| {
                playlist_id == "playlist-123" && !playlist.tracks.is_empty()
            })
            .times(1)
            .in_sequence(&mut seq)
            .return_const(());

        let scheduler =
            RitualScheduler::new(&source, &publisher, &notifier, PlaylistConfig::default());
        let outcome = scheduler
            .create_daily_playlist(&mut StdRng::seed_from_u64(3))
            .unwrap();

        assert_eq!(outcome.playlist_id.as_deref(), Some("playlist-123"));
        assert_eq!(*added_uris.lock().unwrap(), outcome.playlist.track_uris());
    }

    #[test]
    fn test_source_failure_aborts_run() {
        let mut source = MockTrackSource::new();
        source
            .expect_fetch_all_tracks()
            .times(1)
            .returning(|| Err(anyhow::anyhow!("Unauthorized - your access token may be invalid")));

        let mut publisher = MockPublisher::new();
        publisher.expect_create_playlist().times(0);
        publisher.expect_add_tracks().times(0);
        let mut notifier = MockNotifier::new();
        notifier.expect_notify().times(0);

        let scheduler =
            RitualScheduler::new(&source, &publisher, &notifier, PlaylistConfig::default());
        let err = scheduler
            .create_daily_playlist(&mut rand::thread_rng())
            .unwrap_err();

        assert!(err.to_string().contains("Unauthorized"));
    }

    #[test]
    fn test_add_tracks_failure_skips_notification() {
        let mut source = MockTrackSource::new();
        source
            .expect_fetch_all_tracks()
            .returning(|| Ok(liked_songs()));

        let mut publisher = MockPublisher::new();
        publisher
            .expect_create_playlist()
            .times(1)
            .returning(|_, _| Ok("playlist-9".to_string()));
        publisher
            .expect_add_tracks()
            .times(1)
            .returning(|_, _| Err(anyhow::anyhow!("Failed to add tracks to playlist")));

        let mut notifier = MockNotifier::new();
        notifier.expect_notify().times(0);

        let scheduler =
            RitualScheduler::new(&source, &publisher, &notifier, PlaylistConfig::default());
        let result = scheduler.create_daily_playlist(&mut rand::thread_rng());

        assert!(result.is_err());
    }

    #[test]
    fn test_debug_mode_does_not_publish() {
        let mut source = MockTrackSource::new();
        source
            .expect_fetch_all_tracks()
            .returning(|| Ok(liked_songs()));

        let mut publisher = MockPublisher::new();
        publisher.expect_create_playlist().times(0);
        publisher.expect_add_tracks().times(0);
        let mut notifier = MockNotifier::new();
        notifier.expect_notify().times(0);

        let scheduler =
            RitualScheduler::new(&source, &publisher, &notifier, PlaylistConfig::default())
                .with_debug(true);
        let outcome = scheduler.run_once(&mut rand::thread_rng()).unwrap();

        assert!(outcome.playlist_id.is_none());
        assert!(!outcome.playlist.tracks.is_empty());
    }

    #[test]
    fn test_phase_summary_description() {
        let playlist = sample_playlist();

        assert_eq!(
            PlaylistNaming::phase_summary(&playlist),
            "Intro: 2 tracks (7min) | Outro & Stretch: 1 tracks (3min)"
        );
    }

    #[test]
    fn test_notification_bodies() {
        let playlist = sample_playlist();

        let text = NotificationService::text_body(&playlist, "abc");
        assert!(text.starts_with("New Ritual Playlist Created!"));
        assert!(text.contains("Tracks: 3"));
        assert!(text.contains("Total Duration: 10 minutes"));
        assert!(text.contains(" - Intro: 2 tracks, 7 minutes"));
        assert!(text.ends_with("Open in Spotify: https://open.spotify.com/playlist/abc"));

        let html = NotificationService::html_body(&playlist, "abc");
        assert!(html.contains("Outro &amp; Stretch"));
        assert!(html.contains(&playlist_url("abc")));

        assert_eq!(
            NotificationService::subject(&playlist),
            "New Ritual Playlist: The Ritual - 3/7/2025"
        );
    }

    #[test]
    fn test_disabled_notifier_is_silent() {
        let notifier = NotificationService::new(None);
        assert!(!notifier.is_enabled());

        // Must not panic or surface anything to the caller
        notifier.notify(&sample_playlist(), "abc");
        notifier.notify(&sample_playlist(), "abc");
    }

    #[test]
    fn test_next_run_after() {
        let six = NaiveTime::from_hms_opt(6, 0, 0).unwrap();
        let day = NaiveDate::from_ymd_opt(2025, 3, 7).unwrap();

        let before = day.and_hms_opt(5, 30, 0).unwrap();
        assert_eq!(next_run_after(before, six), day.and_time(six));

        let exactly = day.and_time(six);
        let next_day = NaiveDate::from_ymd_opt(2025, 3, 8).unwrap();
        assert_eq!(next_run_after(exactly, six), next_day.and_time(six));

        let after = day.and_hms_opt(23, 59, 0).unwrap();
        assert_eq!(next_run_after(after, six), next_day.and_time(six));
    }

    #[test]
    fn test_parse_authorization_code() {
        assert_eq!(
            parse_authorization_code(
                "http://localhost:8888/callback?code=AQB%2Dxyz&state=ritual-playlist-generator"
            )
            .unwrap(),
            "AQB-xyz"
        );
        assert_eq!(parse_authorization_code("  AQBrawcode \n").unwrap(), "AQBrawcode");
        assert!(parse_authorization_code("http://localhost:8888/callback?error=access_denied").is_err());
        assert!(parse_authorization_code("").is_err());
    }
}
