//! Dialogue scripts: ordered lines with speaker, text, and emotion.
//!
//! Scripts come from YAML files. Indices may be stated explicitly or left
//! out entirely; when omitted they are assigned 1..n in file order. Explicit
//! indices must be >= 1, unique, and strictly increasing; anything else is
//! a configuration error that fails the run before any line is rendered.

use crate::error::{Result, TtsError};
use serde::Deserialize;
use std::path::Path;

/// One line of dialogue to render.
#[derive(Debug, Clone, PartialEq)]
pub struct DialogueLine {
    /// 1-based position, unique within the script; used for output naming.
    pub index: u32,
    /// Speaker identifier, resolved against the profile book.
    pub speaker: String,
    /// Text to speak (only sent when a gateway renders the line).
    pub text: String,
    /// Emotion label; unknown labels fall back to the base profile.
    pub emotion: String,
}

/// An ordered, validated list of dialogue lines.
#[derive(Debug, Clone)]
pub struct Script {
    lines: Vec<DialogueLine>,
}

/// Raw YAML shape of one script entry.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct LineSpec {
    speaker: String,
    text: String,
    #[serde(default = "default_emotion")]
    emotion: String,
    #[serde(default)]
    index: Option<u32>,
}

fn default_emotion() -> String {
    "neutral".to_string()
}

impl Script {
    /// Validate an explicit list of lines.
    pub fn from_lines(lines: Vec<DialogueLine>) -> Result<Self> {
        let mut previous = 0u32;
        for line in &lines {
            if line.index == 0 {
                return Err(TtsError::InvalidScript(format!(
                    "line index must be >= 1 (speaker {})",
                    line.speaker
                )));
            }
            if line.index <= previous {
                return Err(TtsError::InvalidScript(format!(
                    "line indices must be strictly increasing, {} follows {}",
                    line.index, previous
                )));
            }
            previous = line.index;
        }
        Ok(Self { lines })
    }

    /// Load and validate a YAML script file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(TtsError::AssetNotFound(path.to_path_buf()));
        }
        let text = std::fs::read_to_string(path)?;
        Self::from_yaml(&text)
    }

    /// Parse a script from YAML text.
    pub fn from_yaml(text: &str) -> Result<Self> {
        let specs: Vec<LineSpec> = serde_yaml::from_str(text)
            .map_err(|e| TtsError::InvalidScript(e.to_string()))?;
        let lines = specs
            .into_iter()
            .enumerate()
            .map(|(i, spec)| DialogueLine {
                index: spec.index.unwrap_or(i as u32 + 1),
                speaker: spec.speaker,
                text: spec.text,
                emotion: spec.emotion,
            })
            .collect();
        Self::from_lines(lines)
    }

    /// Lines in index order.
    pub fn lines(&self) -> &[DialogueLine] {
        &self.lines
    }

    /// Number of lines.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// True when the script holds no lines.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::{DialogueLine, Script};
    use crate::error::TtsError;

    fn line(index: u32, speaker: &str) -> DialogueLine {
        DialogueLine {
            index,
            speaker: speaker.to_string(),
            text: "hello".to_string(),
            emotion: "neutral".to_string(),
        }
    }

    #[test]
    fn duplicate_indices_are_rejected() {
        let err = Script::from_lines(vec![line(1, "a"), line(1, "b")]).unwrap_err();
        assert!(matches!(err, TtsError::InvalidScript(_)));
    }

    #[test]
    fn decreasing_indices_are_rejected() {
        let err = Script::from_lines(vec![line(2, "a"), line(1, "b")]).unwrap_err();
        assert!(matches!(err, TtsError::InvalidScript(_)));
    }

    #[test]
    fn zero_index_is_rejected() {
        let err = Script::from_lines(vec![line(0, "a")]).unwrap_err();
        assert!(matches!(err, TtsError::InvalidScript(_)));
    }

    #[test]
    fn yaml_without_indices_numbers_in_order() {
        let script = Script::from_yaml(
            "- speaker: hyunjung\n  text: hi\n- speaker: chiho\n  text: bye\n  emotion: polite\n",
        )
        .expect("parse");
        assert_eq!(script.len(), 2);
        assert_eq!(script.lines()[0].index, 1);
        assert_eq!(script.lines()[0].emotion, "neutral");
        assert_eq!(script.lines()[1].index, 2);
        assert_eq!(script.lines()[1].emotion, "polite");
    }

    #[test]
    fn yaml_explicit_indices_are_validated() {
        let err = Script::from_yaml(
            "- {speaker: a, text: x, index: 3}\n- {speaker: b, text: y, index: 3}\n",
        )
        .unwrap_err();
        assert!(matches!(err, TtsError::InvalidScript(_)));
    }
}
