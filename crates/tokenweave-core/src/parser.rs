// ABOUTME: Classifies raw strings as token references, brand references or literals
// ABOUTME: Also recognizes var(--name, fallback) CSS-variable indirections

use std::str::FromStr;
use tokenweave_types::{CssVarRef, Mode, ParsedRef};

const TOKENS_ROOT: &str = "tokens";
const BRAND_ROOT: &str = "brand";
const THEMES_SEGMENT: &str = "themes";

/// Classify `raw` as a reference.
///
/// Returns `None` for anything that is not a well-formed `{...}` reference;
/// callers treat that as a literal. Brand references without an explicit mode
/// take `current_mode`.
pub fn parse(raw: &str, current_mode: Mode) -> Option<ParsedRef> {
    let inner = raw.trim().strip_prefix('{')?.strip_suffix('}')?;
    let segments: Vec<&str> = inner.trim().split('.').collect();
    if segments.iter().any(|s| s.is_empty()) {
        return None;
    }

    let (root, rest) = segments.split_first()?;
    match *root {
        TOKENS_ROOT => {
            if rest.is_empty() {
                return None;
            }
            Some(ParsedRef::token(rest.iter().copied()))
        }
        BRAND_ROOT => parse_brand(rest, current_mode),
        _ => None,
    }
}

fn parse_brand(rest: &[&str], current_mode: Mode) -> Option<ParsedRef> {
    match rest {
        [] => None,
        [THEMES_SEGMENT, mode, path @ ..] if Mode::from_str(mode).is_ok() => {
            let mode = Mode::from_str(mode).ok()?;
            if path.is_empty() {
                return None;
            }
            Some(ParsedRef::brand(mode, path.iter().copied()))
        }
        [THEMES_SEGMENT, path @ ..] => {
            if path.is_empty() {
                return None;
            }
            Some(ParsedRef::brand_inherited(current_mode, path.iter().copied()))
        }
        // Legacy `brand.<mode>.<path>` spelling
        [mode, path @ ..] if !path.is_empty() && Mode::from_str(mode).is_ok() => {
            let mode = Mode::from_str(mode).ok()?;
            Some(ParsedRef::brand(mode, path.iter().copied()))
        }
        path => Some(ParsedRef::brand_inherited(current_mode, path.iter().copied())),
    }
}

/// Whether `raw` looks like a `{...}` reference at all
pub fn is_reference(raw: &str) -> bool {
    let trimmed = raw.trim();
    trimmed.starts_with('{') && trimmed.ends_with('}')
}

/// Recognize `var(--name)` and `var(--name, fallback)`.
pub fn parse_css_var(raw: &str) -> Option<CssVarRef> {
    let inner = raw.trim().strip_prefix("var(")?.strip_suffix(')')?;
    let (name, fallback) = match inner.split_once(',') {
        Some((name, fallback)) => (name.trim(), Some(fallback.trim())),
        None => (inner.trim(), None),
    };

    if !name.starts_with("--") || name.len() <= 2 || name.contains(char::is_whitespace) {
        return None;
    }

    Some(CssVarRef {
        name: name.to_string(),
        fallback: fallback.filter(|f| !f.is_empty()).map(str::to_string),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_reference() {
        assert_eq!(
            parse("{tokens.colors.scale-05.300}", Mode::Light),
            Some(ParsedRef::token(["colors", "scale-05", "300"]))
        );
        assert_eq!(
            parse("  {tokens.opacity.high}  ", Mode::Dark),
            Some(ParsedRef::token(["opacity", "high"]))
        );
    }

    #[test]
    fn test_brand_with_explicit_mode() {
        let parsed = parse("{brand.themes.dark.palettes.core-colors.white}", Mode::Light).unwrap();
        assert_eq!(
            parsed,
            ParsedRef::brand(Mode::Dark, ["palettes", "core-colors", "white"])
        );
    }

    #[test]
    fn test_brand_inherits_current_mode() {
        let parsed = parse("{brand.palettes.core-colors.black.tone}", Mode::Dark).unwrap();
        assert_eq!(
            parsed,
            ParsedRef::brand_inherited(Mode::Dark, ["palettes", "core-colors", "black", "tone"])
        );

        let parsed = parse("{brand.themes.interactive}", Mode::Light).unwrap();
        assert_eq!(parsed, ParsedRef::brand_inherited(Mode::Light, ["interactive"]));
    }

    #[test]
    fn test_legacy_brand_mode_segment() {
        let parsed = parse("{brand.light.interactive}", Mode::Dark).unwrap();
        assert_eq!(parsed, ParsedRef::brand(Mode::Light, ["interactive"]));
    }

    #[test]
    fn test_non_references_are_none() {
        for raw in [
            "#336699",
            "var(--color-white-tone)",
            "plain text",
            "{}",
            "{tokens}",
            "{brand}",
            "{brand.themes.light}",
            "{tokens..colors}",
            "{palette.white}",
            "{tokens.colors.scale-05.300",
        ] {
            assert_eq!(parse(raw, Mode::Light), None, "{raw} is not a reference");
        }
    }

    #[test]
    fn test_parse_css_var() {
        assert_eq!(
            parse_css_var("var(--color-white-tone)"),
            Some(CssVarRef {
                name: "--color-white-tone".into(),
                fallback: None
            })
        );
        assert_eq!(
            parse_css_var("var(--x, var(--y, #fff))"),
            Some(CssVarRef {
                name: "--x".into(),
                fallback: Some("var(--y, #fff)".into())
            })
        );
        assert_eq!(parse_css_var("var(color)"), None);
        assert_eq!(parse_css_var("var(--)"), None);
        assert_eq!(parse_css_var("#ffffff"), None);
    }

    #[test]
    fn test_is_reference() {
        assert!(is_reference("{brand.interactive}"));
        assert!(!is_reference("#ffffff"));
    }
}
