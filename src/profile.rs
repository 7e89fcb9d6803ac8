//! Tone profiles and the speaker/emotion resolver.
//!
//! Each speaker has a base profile. Emotion labels are grouped, and a group
//! carries multipliers applied on top of the base. Groups are an ordered
//! list: the first group containing a label wins, so overlapping label sets
//! have a defined outcome.

use crate::error::{Result, TtsError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Multiplicative tone factors for one rendered line.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ToneProfile {
    /// Pitch factor, > 0. Applied as a duration-conflating resample.
    pub pitch: f32,
    /// Speed factor, > 0. Values above 1.0 shorten the clip.
    pub speed: f32,
    /// Volume factor, >= 0. Output is clipped after scaling.
    pub volume: f32,
}

impl ToneProfile {
    /// Build a profile from raw factors.
    pub fn new(pitch: f32, speed: f32, volume: f32) -> Self {
        Self {
            pitch,
            speed,
            volume,
        }
    }

    /// The no-op profile.
    pub fn neutral() -> Self {
        Self::new(1.0, 1.0, 1.0)
    }
}

/// A named set of emotion labels with shared tone multipliers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EmotionGroup {
    /// Group name, informational only.
    pub name: String,
    /// Emotion labels that select this group.
    pub labels: Vec<String>,
    /// Pitch multiplier applied on top of the base profile.
    #[serde(default = "one")]
    pub pitch: f32,
    /// Speed multiplier applied on top of the base profile.
    #[serde(default = "one")]
    pub speed: f32,
    /// Volume multiplier applied on top of the base profile.
    #[serde(default = "one")]
    pub volume: f32,
}

fn one() -> f32 {
    1.0
}

/// Speaker base profiles plus ordered emotion groups.
#[derive(Debug, Clone)]
pub struct ProfileBook {
    speakers: BTreeMap<String, ToneProfile>,
    groups: Vec<EmotionGroup>,
}

impl ProfileBook {
    /// Build a book from explicit tables.
    pub fn new(speakers: BTreeMap<String, ToneProfile>, groups: Vec<EmotionGroup>) -> Self {
        Self { speakers, groups }
    }

    /// Speaker names in deterministic (sorted) order.
    pub fn speaker_names(&self) -> impl Iterator<Item = &str> {
        self.speakers.keys().map(String::as_str)
    }

    /// Look up a speaker's base profile.
    pub fn base_profile(&self, speaker: &str) -> Result<ToneProfile> {
        self.speakers
            .get(speaker)
            .copied()
            .ok_or_else(|| TtsError::UnknownSpeaker(speaker.to_string()))
    }

    /// Resolve the effective profile for a `(speaker, emotion)` pair.
    ///
    /// An unknown emotion is not an error: the base profile is returned
    /// unchanged. Group order is priority order when label sets overlap.
    pub fn resolve(&self, speaker: &str, emotion: &str) -> Result<ToneProfile> {
        let base = self.base_profile(speaker)?;
        let group = self
            .groups
            .iter()
            .find(|g| g.labels.iter().any(|label| label == emotion));
        Ok(match group {
            Some(group) => ToneProfile::new(
                base.pitch * group.pitch,
                base.speed * group.speed,
                base.volume * group.volume,
            ),
            None => base,
        })
    }
}

impl Default for ProfileBook {
    /// Built-in cast and emotion groups of the sushi dialogue demo.
    fn default() -> Self {
        Self::new(default_speakers(), default_groups())
    }
}

/// Base profiles of the built-in cast.
pub fn default_speakers() -> BTreeMap<String, ToneProfile> {
    let mut speakers = BTreeMap::new();
    speakers.insert("hyunjung".to_string(), ToneProfile::new(1.05, 0.95, 1.1));
    speakers.insert("hwanseok".to_string(), ToneProfile::new(0.95, 1.05, 1.0));
    speakers.insert("chiho".to_string(), ToneProfile::new(1.0, 0.9, 0.9));
    speakers
}

/// Built-in emotion groups, in priority order.
pub fn default_groups() -> Vec<EmotionGroup> {
    vec![
        EmotionGroup {
            name: "excited".to_string(),
            labels: vec![
                "excited".to_string(),
                "amazed".to_string(),
                "shocked".to_string(),
            ],
            pitch: 1.0,
            speed: 1.1,
            volume: 1.2,
        },
        EmotionGroup {
            name: "polite".to_string(),
            labels: vec![
                "polite".to_string(),
                "professional".to_string(),
                "confirming".to_string(),
            ],
            pitch: 1.0,
            speed: 0.9,
            volume: 1.0,
        },
        EmotionGroup {
            name: "devastated".to_string(),
            labels: vec!["devastated".to_string(), "worried".to_string()],
            pitch: 0.9,
            speed: 0.8,
            volume: 1.0,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::{EmotionGroup, ProfileBook, ToneProfile};
    use crate::error::TtsError;
    use std::collections::BTreeMap;

    #[test]
    fn unknown_speaker_errors() {
        let book = ProfileBook::default();
        let err = book.resolve("nobody", "neutral").unwrap_err();
        assert!(matches!(err, TtsError::UnknownSpeaker(name) if name == "nobody"));
    }

    #[test]
    fn unknown_emotion_falls_back_to_base() {
        let book = ProfileBook::default();
        let base = book.base_profile("chiho").expect("base");
        let resolved = book.resolve("chiho", "sleepy").expect("resolve");
        assert_eq!(resolved, base);
    }

    #[test]
    fn emotion_group_multiplies_base_factors() {
        let book = ProfileBook::default();
        let resolved = book.resolve("hwanseok", "shocked").expect("resolve");
        assert!((resolved.speed - 1.05 * 1.1).abs() < 1e-6);
        assert!((resolved.volume - 1.2).abs() < 1e-6);
        assert!((resolved.pitch - 0.95).abs() < 1e-6);
    }

    #[test]
    fn first_matching_group_wins() {
        let mut speakers = BTreeMap::new();
        speakers.insert("a".to_string(), ToneProfile::neutral());
        let groups = vec![
            EmotionGroup {
                name: "loud".to_string(),
                labels: vec!["tense".to_string()],
                pitch: 1.0,
                speed: 1.0,
                volume: 2.0,
            },
            EmotionGroup {
                name: "quiet".to_string(),
                labels: vec!["tense".to_string()],
                pitch: 1.0,
                speed: 1.0,
                volume: 0.5,
            },
        ];
        let book = ProfileBook::new(speakers, groups);
        let resolved = book.resolve("a", "tense").expect("resolve");
        assert_eq!(resolved.volume, 2.0);
    }

    #[test]
    fn speaker_names_are_sorted() {
        let book = ProfileBook::default();
        let names: Vec<&str> = book.speaker_names().collect();
        assert_eq!(names, vec!["chiho", "hwanseok", "hyunjung"]);
    }
}
