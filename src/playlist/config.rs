use log::warn;
use serde::{Deserialize, Serialize};

const MINUTE_MS: u64 = 60 * 1000;

/// Configuration for one ritual playlist run
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlaylistConfig {
    pub name: String, // Base name, the run date is appended when publishing
    pub description: String,
    pub total_duration_ms: u64,
    pub phases: Vec<PhaseDefinition>, // Evaluated strictly in this order
}

/// A thematic segment of the playlist with its own quota
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PhaseDefinition {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub target_duration_ms: u64,
    #[serde(default)]
    pub criteria: PhaseCriteria,
}

/// Static selection rules for a phase. Both are optional; a phase with
/// neither accepts every remaining track.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PhaseCriteria {
    #[serde(default)]
    pub keywords: Option<Vec<String>>, // Case-insensitive substring match on name + artists
    #[serde(default)]
    pub duration_range: Option<(u64, u64)>, // Inclusive [min, max] in milliseconds
}

impl PhaseCriteria {
    /// Keywords, treating an empty list the same as no list
    pub fn active_keywords(&self) -> Option<&[String]> {
        self.keywords.as_deref().filter(|k| !k.is_empty())
    }
}

fn phase(
    name: &str,
    description: &str,
    target_minutes: u64,
    keywords: &[&str],
    range_minutes: (u64, u64),
) -> PhaseDefinition {
    PhaseDefinition {
        name: name.to_string(),
        description: description.to_string(),
        target_duration_ms: target_minutes * MINUTE_MS,
        criteria: PhaseCriteria {
            keywords: Some(keywords.iter().map(|k| k.to_string()).collect()),
            duration_range: Some((range_minutes.0 * MINUTE_MS, range_minutes.1 * MINUTE_MS)),
        },
    }
}

/// The six phases of The Ritual
pub fn default_phases() -> Vec<PhaseDefinition> {
    vec![
        phase(
            "Going to Temple",
            "Phase Shift / The Anticipation",
            3,
            &[
                "temple", "anticipation", "phase", "shift", "intro", "beginning", "meditation",
                "calm", "serene", "peace", "still", "quiet", "ambient", "acoustic",
            ],
            (2, 6),
        ),
        phase(
            "Intro",
            "Gettin' Goin' / Range Ridin' / Trance Walk / Warmup",
            3,
            &[
                "intro", "warm", "begin", "start", "walk", "ride", "trance", "groove", "build",
                "rise", "awakening",
            ],
            (2, 5),
        ),
        phase(
            "Dancing With the Divine",
            "The Prayer / Ecstasy / Being the Whirling Dervish / Celebrate / Finding Center",
            4,
            &[
                "dance", "divine", "prayer", "ecstasy", "celebrate", "center", "dervish", "bliss",
                "joy", "euphoria", "sacred", "spirit",
            ],
            (3, 6),
        ),
        phase(
            "Dealer's Choice",
            "Wild card - anything goes",
            3,
            &["choice", "wild", "free", "open", "surprise", "random", "mix", "variety"],
            (1, 8),
        ),
        phase(
            "Unleashing the Beast",
            "Climbing the Mountain / Thick of It / Innit",
            4,
            &[
                "beast", "mountain", "thick", "climb", "unleash", "power", "intense", "fury",
                "rage", "strength", "warrior", "battle", "fire", "energy",
            ],
            (3, 7),
        ),
        phase(
            "Outro",
            "Cool Down / Stretch",
            3,
            &[
                "outro", "cool", "down", "stretch", "end", "calm", "relax", "wind", "finish",
                "close", "peaceful", "gentle", "soft",
            ],
            (2, 6),
        ),
    ]
}

impl Default for PlaylistConfig {
    fn default() -> Self {
        Self {
            name: "The Ritual".to_string(),
            description: "A 20-minute journey through The Ritual phases".to_string(),
            total_duration_ms: 20 * MINUTE_MS,
            phases: default_phases(),
        }
    }
}

impl PlaylistConfig {
    /// Load a playlist configuration from a JSON file
    pub fn load_from_file(path: &str) -> Result<PlaylistConfig, Box<dyn std::error::Error>> {
        let content = std::fs::read_to_string(path)?;
        let config: PlaylistConfig = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Load from `path` if given, falling back to the default ritual when the
    /// file is missing or malformed. Whatever is returned is used as-is.
    pub fn load_or_default(path: Option<&str>) -> PlaylistConfig {
        let Some(path) = path else {
            return PlaylistConfig::default();
        };

        match Self::load_from_file(path) {
            Ok(config) => config,
            Err(e) => {
                warn!("Failed to load playlist configuration from '{path}': {e}. Using default ritual phases.");
                PlaylistConfig::default()
            }
        }
    }
}
