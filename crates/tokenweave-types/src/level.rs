// ABOUTME: Canonical color scale levels (050..900, terminal 1000)
// ABOUTME: Normalizes spellings such as "000", "50" and 50 to one ordered key

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// A level within one color family.
///
/// Levels are stored numerically so they order lightest to darkest. The sentinel
/// `000` is an alias of `050`; `1000` is a genuine terminal level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScaleLevel(u32);

impl ScaleLevel {
    /// Lightest canonical level
    pub const FIRST: ScaleLevel = ScaleLevel(50);
    /// Terminal (darkest) canonical level
    pub const TERMINAL: ScaleLevel = ScaleLevel(1000);

    /// Parse and normalize a level key. Returns `None` for anything that is not
    /// a run of ASCII digits.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.is_empty() || raw.len() > 4 || !raw.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let value: u32 = raw.parse().ok()?;
        Some(Self::from_number(value))
    }

    pub fn from_number(value: u32) -> Self {
        if value == 0 { Self::FIRST } else { ScaleLevel(value) }
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

impl fmt::Display for ScaleLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:03}", self.0)
    }
}

impl Serialize for ScaleLevel {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for ScaleLevel {
    fn deserialize<D>(deserializer: D) -> Result<ScaleLevel, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = serde_json::Value::deserialize(deserializer)?;
        let parsed = match &raw {
            serde_json::Value::String(s) => ScaleLevel::parse(s),
            serde_json::Value::Number(n) => n
                .as_u64()
                .and_then(|n| u32::try_from(n).ok())
                .map(ScaleLevel::from_number),
            _ => None,
        };
        parsed.ok_or_else(|| serde::de::Error::custom(format!("invalid scale level: {raw}")))
    }
}
