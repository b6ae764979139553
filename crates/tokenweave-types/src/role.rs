// ABOUTME: Semantic roles inside the theme document (tone, on-tone, interactive)
// ABOUTME: Also the emphasis opacities and stepping directions used by the cascade

use serde::{Deserialize, Serialize};
use std::fmt;

/// Sub-value of a core color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ColorRole {
    Tone,
    OnTone,
    Interactive,
}

impl ColorRole {
    pub fn key(self) -> &'static str {
        match self {
            ColorRole::Tone => "tone",
            ColorRole::OnTone => "on-tone",
            ColorRole::Interactive => "interactive",
        }
    }
}

impl fmt::Display for ColorRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Text emphasis opacity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Emphasis {
    High,
    Low,
}

impl Emphasis {
    pub fn key(self) -> &'static str {
        match self {
            Emphasis::High => "high-emphasis",
            Emphasis::Low => "low-emphasis",
        }
    }
}

/// Direction along a color scale. Lighter means towards lower levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Lighter,
    Darker,
}

impl Direction {
    pub fn reverse(self) -> Self {
        match self {
            Direction::Lighter => Direction::Darker,
            Direction::Darker => Direction::Lighter,
        }
    }
}
