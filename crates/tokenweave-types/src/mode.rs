// ABOUTME: Light/dark theme mode shared by parsing, resolution and the cascade
// ABOUTME: Pure data with serde support for documents and configuration

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Theme mode a brand reference or theme entry is scoped to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[derive(Default)]
pub enum Mode {
    #[default]
    Light,
    Dark,
}

impl Mode {
    pub const ALL: [Mode; 2] = [Mode::Light, Mode::Dark];

    /// Key used for this mode inside theme documents
    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Light => "light",
            Mode::Dark => "dark",
        }
    }

    pub fn is_dark(self) -> bool {
        matches!(self, Mode::Dark)
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "light" => Ok(Mode::Light),
            "dark" => Ok(Mode::Dark),
            other => Err(format!("unknown theme mode: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_parsing() {
        assert_eq!("light".parse::<Mode>().unwrap(), Mode::Light);
        assert_eq!("DARK".parse::<Mode>().unwrap(), Mode::Dark);
        assert!("dim".parse::<Mode>().is_err());
    }

    #[test]
    fn test_mode_serde() {
        let json = serde_json::to_string(&Mode::Dark).unwrap();
        assert_eq!(json, "\"dark\"");
        let mode: Mode = serde_json::from_str("\"light\"").unwrap();
        assert_eq!(mode, Mode::Light);
    }
}
