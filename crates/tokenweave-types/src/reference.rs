// ABOUTME: Parsed symbolic references into the token and theme documents
// ABOUTME: Tagged union used by the parser, the resolver and the compliance cascade

use crate::level::ScaleLevel;
use crate::mode::Mode;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A classified `{...}` reference
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum ParsedRef {
    /// Path into the token document, leading segment is the category
    /// (e.g. `["colors", "scale-05", "300"]`)
    Token { path: Vec<String> },
    /// Path into the theme document. `explicit` is false when the mode was
    /// inherited from the parse context rather than spelled out.
    Brand {
        mode: Mode,
        explicit: bool,
        path: Vec<String>,
    },
}

impl ParsedRef {
    pub fn token<I, S>(path: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ParsedRef::Token {
            path: path.into_iter().map(Into::into).collect(),
        }
    }

    /// Brand reference with an explicit mode
    pub fn brand<I, S>(mode: Mode, path: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ParsedRef::Brand {
            mode,
            explicit: true,
            path: path.into_iter().map(Into::into).collect(),
        }
    }

    /// Brand reference that took its mode from the context
    pub fn brand_inherited<I, S>(mode: Mode, path: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ParsedRef::Brand {
            mode,
            explicit: false,
            path: path.into_iter().map(Into::into).collect(),
        }
    }

    pub fn path(&self) -> &[String] {
        match self {
            ParsedRef::Token { path } | ParsedRef::Brand { path, .. } => path,
        }
    }
}

impl fmt::Display for ParsedRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParsedRef::Token { path } => write!(f, "{{tokens.{}}}", path.join(".")),
            ParsedRef::Brand {
                mode,
                explicit: true,
                path,
            } => write!(f, "{{brand.themes.{mode}.{}}}", path.join(".")),
            ParsedRef::Brand {
                explicit: false,
                path,
                ..
            } => write!(f, "{{brand.{}}}", path.join(".")),
        }
    }
}

/// Coordinates of one color token: internal scale key plus level
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TokenPath {
    pub scale_key: String,
    pub level: ScaleLevel,
}

impl TokenPath {
    pub fn new(scale_key: impl Into<String>, level: ScaleLevel) -> Self {
        Self {
            scale_key: scale_key.into(),
            level,
        }
    }

    /// Index key (`colors/<scale>/<level>`)
    pub fn key(&self) -> String {
        format!("colors/{}/{}", self.scale_key, self.level)
    }

    /// Reference string that points back at this token
    pub fn to_reference(&self) -> String {
        let level = self.level.to_string();
        ParsedRef::token(["colors", self.scale_key.as_str(), level.as_str()]).to_string()
    }
}

impl fmt::Display for TokenPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.scale_key, self.level)
    }
}

/// `var(--name)` or `var(--name, fallback)` found in materialized output
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CssVarRef {
    pub name: String,
    pub fallback: Option<String>,
}
