#[cfg(test)]
mod tests {
    use super::super::utils::{PlaylistNaming, format_duration, rounded_minutes};
    use super::super::*;
    use chrono::NaiveDate;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_config_file(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_default_config_is_the_ritual() {
        let config = PlaylistConfig::default();

        assert_eq!(config.name, "The Ritual");
        assert_eq!(config.total_duration_ms, 1_200_000);

        let names: Vec<&str> = config.phases.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "Going to Temple",
                "Intro",
                "Dancing With the Divine",
                "Dealer's Choice",
                "Unleashing the Beast",
                "Outro",
            ]
        );
    }

    #[test]
    fn test_default_phase_quotas_and_ranges() {
        let phases = default_phases();

        let temple = &phases[0];
        assert_eq!(temple.target_duration_ms, 180_000);
        assert_eq!(temple.criteria.duration_range, Some((120_000, 360_000)));
        assert!(
            temple
                .criteria
                .keywords
                .as_ref()
                .unwrap()
                .contains(&"temple".to_string())
        );

        let dealers_choice = &phases[3];
        assert_eq!(dealers_choice.criteria.duration_range, Some((60_000, 480_000)));

        let beast = &phases[4];
        assert_eq!(beast.target_duration_ms, 240_000);
        assert_eq!(beast.criteria.duration_range, Some((180_000, 420_000)));

        // Phase quotas add up to the 20-minute total
        let quota_total: u64 = phases.iter().map(|p| p.target_duration_ms).sum();
        assert_eq!(quota_total, 1_200_000);
    }

    #[test]
    fn test_load_from_json_file() {
        let file = write_config_file(
            r#"{
                "name": "Morning Flow",
                "description": "Short wake-up set",
                "total_duration_ms": 600000,
                "phases": [
                    {
                        "name": "Wake",
                        "description": "Ease in",
                        "target_duration_ms": 240000,
                        "criteria": { "keywords": ["morning", "sun"], "duration_range": [120000, 300000] }
                    },
                    {
                        "name": "Anything",
                        "target_duration_ms": 360000
                    }
                ]
            }"#,
        );

        let config = PlaylistConfig::load_from_file(file.path().to_str().unwrap()).unwrap();

        assert_eq!(config.name, "Morning Flow");
        assert_eq!(config.total_duration_ms, 600_000);
        assert_eq!(config.phases.len(), 2);
        assert_eq!(
            config.phases[0].criteria.keywords,
            Some(vec!["morning".to_string(), "sun".to_string()])
        );
        assert_eq!(config.phases[0].criteria.duration_range, Some((120_000, 300_000)));
        assert_eq!(config.phases[1].description, "");
        assert_eq!(config.phases[1].criteria, PhaseCriteria::default());
    }

    #[test]
    fn test_load_or_default_without_path() {
        assert_eq!(PlaylistConfig::load_or_default(None), PlaylistConfig::default());
    }

    #[test]
    fn test_load_or_default_falls_back_on_missing_file() {
        let config = PlaylistConfig::load_or_default(Some("/definitely/not/here/ritual.json"));
        assert_eq!(config, PlaylistConfig::default());
    }

    #[test]
    fn test_load_or_default_falls_back_on_malformed_file() {
        let file = write_config_file("{ \"name\": \"Broken\", \"phases\": ");

        let config = PlaylistConfig::load_or_default(Some(file.path().to_str().unwrap()));
        assert_eq!(config, PlaylistConfig::default());
    }

    #[test]
    fn test_loaded_config_is_used_as_is() {
        // Odd values are not re-validated
        let file = write_config_file(
            r#"{ "name": "Odd", "description": "", "total_duration_ms": 0, "phases": [] }"#,
        );

        let config = PlaylistConfig::load_or_default(Some(file.path().to_str().unwrap()));
        assert_eq!(config.name, "Odd");
        assert_eq!(config.total_duration_ms, 0);
        assert!(config.phases.is_empty());
    }

    #[test]
    fn test_config_round_trips_through_json() {
        let config = PlaylistConfig::default();
        let json = serde_json::to_string(&config).unwrap();

        assert!(json.contains("\"duration_range\":[120000,360000]"));
        let parsed: PlaylistConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_dated_playlist_name() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 7).unwrap();
        assert_eq!(
            PlaylistNaming::name_for_date("The Ritual", date),
            "The Ritual - 3/7/2025"
        );
        assert!(PlaylistNaming::dated_name("The Ritual").starts_with("The Ritual - "));
    }

    #[test]
    fn test_minute_rounding_and_display() {
        assert_eq!(rounded_minutes(0), 0);
        assert_eq!(rounded_minutes(29_999), 0);
        assert_eq!(rounded_minutes(30_000), 1);
        assert_eq!(rounded_minutes(390_000), 7);
        assert_eq!(rounded_minutes(1_200_000), 20);

        assert_eq!(format_duration(185_000), "3:05");
        assert_eq!(format_duration(59_999), "0:59");
    }
}
