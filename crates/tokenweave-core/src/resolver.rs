// ABOUTME: Recursive reference resolution over token, theme and CSS-variable snapshots
// ABOUTME: Bounded by a depth counter and a visited set; classifies the final literal

use crate::canonical::canonical_theme_path;
use crate::color_math::{Rgb, parse_hex};
use crate::css_store::CssVariableStore;
use crate::document::{ThemeDocument, VALUE_KEY, leaf_raw};
use crate::error::ResolveError;
use crate::parser::{parse, parse_css_var};
use crate::token_index::TokenIndex;
use serde_json::Value;
use std::collections::HashSet;
use std::fmt;
use tokenweave_logging::{debug, error};
use tokenweave_types::{CssVarRef, Mode, ParsedRef, TokenPath};

/// Hops allowed before a chain is treated as cyclic
pub const DEFAULT_MAX_DEPTH: usize = 10;

const TONE_KEY: &str = "tone";

/// Snapshots and settings one resolution reads from
#[derive(Clone, Copy)]
pub struct ResolveContext<'a> {
    pub mode: Mode,
    pub index: &'a TokenIndex,
    pub theme: &'a ThemeDocument,
    pub css: Option<&'a dyn CssVariableStore>,
    pub max_depth: usize,
}

impl<'a> ResolveContext<'a> {
    pub fn new(mode: Mode, index: &'a TokenIndex, theme: &'a ThemeDocument) -> Self {
        Self {
            mode,
            index,
            theme,
            css: None,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    pub fn with_css(mut self, css: &'a dyn CssVariableStore) -> Self {
        self.css = Some(css);
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }
}

impl fmt::Debug for ResolveContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolveContext")
            .field("mode", &self.mode)
            .field("index_generation", &self.index.generation())
            .field("css", &self.css.is_some())
            .field("max_depth", &self.max_depth)
            .finish()
    }
}

/// A concrete value at the end of a reference chain
#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedValue {
    Color(Rgb),
    Dimension { value: f64, unit: String },
    /// Unitless number; `N%` is stored as `N / 100`
    Number(f64),
    Text(String),
}

impl ResolvedValue {
    /// Only `#`-prefixed hex is a color here; see [`Resolution::color`].
    pub fn classify(literal: &str) -> Self {
        let literal = literal.trim();
        if literal.starts_with('#') && let Ok(rgb) = parse_hex(literal) {
            return ResolvedValue::Color(rgb);
        }
        if let Some(percent) = literal.strip_suffix('%')
            && let Ok(value) = percent.trim().parse::<f64>()
        {
            return ResolvedValue::Number(value / 100.0);
        }
        if let Ok(value) = literal.parse::<f64>()
            && value.is_finite()
        {
            return ResolvedValue::Number(value);
        }

        let split = literal
            .find(|c: char| !(c.is_ascii_digit() || matches!(c, '.' | '-' | '+')))
            .unwrap_or(literal.len());
        let (number, unit) = literal.split_at(split);
        if !number.is_empty()
            && !unit.is_empty()
            && unit.chars().all(|c| c.is_ascii_alphabetic())
            && let Ok(value) = number.parse::<f64>()
        {
            return ResolvedValue::Dimension {
                value,
                unit: unit.to_string(),
            };
        }

        ResolvedValue::Text(literal.to_string())
    }

    pub fn as_color(&self) -> Option<Rgb> {
        match self {
            ResolvedValue::Color(rgb) => Some(*rgb),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            ResolvedValue::Number(value) => Some(*value),
            _ => None,
        }
    }

    /// Form written to CSS custom properties
    pub fn to_css(&self) -> String {
        match self {
            ResolvedValue::Color(rgb) => rgb.to_hex(),
            ResolvedValue::Dimension { value, unit } => format!("{value}{unit}"),
            ResolvedValue::Number(value) => value.to_string(),
            ResolvedValue::Text(text) => text.clone(),
        }
    }
}

/// Result of a successful resolution
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub value: ResolvedValue,
    /// Final literal before classification
    pub literal: String,
    /// Last color token the chain passed through
    pub origin: Option<TokenPath>,
}

impl Resolution {
    /// The value read as a color, also accepting hex without a leading `#`
    pub fn color(&self) -> Option<Rgb> {
        match &self.value {
            ResolvedValue::Color(rgb) => Some(*rgb),
            ResolvedValue::Number(_) => None,
            _ => parse_hex(&self.literal).ok(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum Visit {
    Token(String),
    Brand(Mode, Vec<String>),
    CssVar(String),
}

struct Walk<'a, 'r> {
    ctx: &'r ResolveContext<'a>,
    start: &'r str,
    mode: Mode,
    depth: usize,
    visited: HashSet<Visit>,
    origin: Option<TokenPath>,
}

impl Walk<'_, '_> {
    fn enter(&mut self, visit: Visit) -> Result<(), ResolveError> {
        self.depth += 1;
        if self.depth > self.ctx.max_depth || !self.visited.insert(visit) {
            return Err(ResolveError::cycle(self.start, self.ctx.max_depth));
        }
        Ok(())
    }

    fn resolve_raw(&mut self, raw: &str) -> Result<String, ResolveError> {
        if let Some(parsed) = parse(raw, self.mode) {
            return self.resolve_parsed(&parsed);
        }
        if let Some(var) = parse_css_var(raw) {
            return self.resolve_css_var(var);
        }
        Ok(raw.trim().to_string())
    }

    fn resolve_parsed(&mut self, parsed: &ParsedRef) -> Result<String, ResolveError> {
        match parsed {
            ParsedRef::Token { path } => {
                let index = self.ctx.index;
                let key = index
                    .normalize_key(path)
                    .ok_or_else(|| ResolveError::unresolvable(parsed.to_string()))?;
                self.enter(Visit::Token(key))?;

                let literal = index
                    .get_segments(path)
                    .ok_or_else(|| ResolveError::unresolvable(parsed.to_string()))?;
                if let Some(origin) = index.token_path(path) {
                    self.origin = Some(origin);
                }
                self.resolve_raw(literal)
            }
            ParsedRef::Brand { mode, path, .. } => {
                self.enter(Visit::Brand(*mode, canonical_theme_path(path)))?;

                let node = self
                    .ctx
                    .theme
                    .node(*mode, path)
                    .ok_or_else(|| ResolveError::unresolvable(parsed.to_string()))?;
                let raw = brand_leaf(node).ok_or_else(|| ResolveError::unresolvable(parsed.to_string()))?;

                // Nested inherited references stay in the mode of the node that holds them
                let outer = std::mem::replace(&mut self.mode, *mode);
                let result = self.resolve_raw(&raw);
                self.mode = outer;
                result
            }
        }
    }

    fn resolve_css_var(&mut self, var: CssVarRef) -> Result<String, ResolveError> {
        self.enter(Visit::CssVar(var.name.clone()))?;

        let stored = self
            .ctx
            .css
            .and_then(|css| css.read(&var.name).or_else(|| css.read_resolved(&var.name)));

        match stored.or(var.fallback) {
            Some(value) => self.resolve_raw(&value),
            None => Err(ResolveError::unresolvable(format!("var({})", var.name))),
        }
    }
}

/// Literal held by a theme node; a color group without `$value` stands for its tone
fn brand_leaf(node: &Value) -> Option<String> {
    match node {
        Value::Object(map) if !map.contains_key(VALUE_KEY) => map.get(TONE_KEY).and_then(leaf_raw),
        other => leaf_raw(other),
    }
}

/// Resolve `raw` through every reference it leads to.
pub fn resolve(raw: &str, ctx: &ResolveContext<'_>) -> Result<Resolution, ResolveError> {
    let mut walk = Walk {
        ctx,
        start: raw,
        mode: ctx.mode,
        depth: 0,
        visited: HashSet::new(),
        origin: None,
    };
    let literal = walk.resolve_raw(raw)?;

    Ok(Resolution {
        value: ResolvedValue::classify(&literal),
        literal,
        origin: walk.origin,
    })
}

/// Like [`resolve`], but logs failures and reports them as `None`.
///
/// Cycles are logged as errors; misses are ordinary and logged at debug level.
pub fn resolve_logged(raw: &str, ctx: &ResolveContext<'_>) -> Option<Resolution> {
    match resolve(raw, ctx) {
        Ok(resolution) => Some(resolution),
        Err(err) if err.is_recoverable() => {
            debug!(reference = raw, mode = %ctx.mode, error = %err, "Reference not resolved");
            None
        }
        Err(err) => {
            error!(reference = raw, mode = %ctx.mode, error = %err, "Reference chain aborted");
            None
        }
    }
}

/// Collaborator-facing resolution: the value, or `None` on any failure
pub fn resolve_reference(raw: &str, ctx: &ResolveContext<'_>) -> Option<ResolvedValue> {
    resolve_logged(raw, ctx).map(|resolution| resolution.value)
}

pub fn resolve_color(raw: &str, ctx: &ResolveContext<'_>) -> Option<Rgb> {
    resolve_logged(raw, ctx).and_then(|resolution| resolution.color())
}

/// Opacity as a fraction in `[0, 1]`. Bare numbers above 1 are read as percentages.
pub fn resolve_opacity(raw: &str, ctx: &ResolveContext<'_>) -> Option<f64> {
    let value = resolve_reference(raw, ctx)?.as_number()?;
    let fraction = if value > 1.0 { value / 100.0 } else { value };
    Some(fraction.clamp(0.0, 1.0))
}

pub fn resolve_dimension(raw: &str, ctx: &ResolveContext<'_>) -> Option<(f64, String)> {
    match resolve_reference(raw, ctx)? {
        ResolvedValue::Dimension { value, unit } => Some((value, unit)),
        ResolvedValue::Number(value) if value == 0.0 => Some((0.0, String::new())),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_literals() {
        assert_eq!(
            ResolvedValue::classify("#336699"),
            ResolvedValue::Color(Rgb::new(0x33, 0x66, 0x99))
        );
        assert_eq!(ResolvedValue::classify("87%"), ResolvedValue::Number(0.87));
        assert_eq!(ResolvedValue::classify("0.6"), ResolvedValue::Number(0.6));
        assert_eq!(
            ResolvedValue::classify("8px"),
            ResolvedValue::Dimension {
                value: 8.0,
                unit: "px".into()
            }
        );
        assert_eq!(
            ResolvedValue::classify("-1.5rem"),
            ResolvedValue::Dimension {
                value: -1.5,
                unit: "rem".into()
            }
        );
        assert_eq!(
            ResolvedValue::classify("bold"),
            ResolvedValue::Text("bold".into())
        );
        assert_eq!(
            ResolvedValue::classify("1px solid"),
            ResolvedValue::Text("1px solid".into())
        );
    }

    #[test]
    fn test_hex_letter_words_stay_text() {
        for word in ["facade", "decade", "beaded"] {
            assert_eq!(ResolvedValue::classify(word), ResolvedValue::Text(word.into()));
        }
        assert_eq!(
            ResolvedValue::classify("#facade"),
            ResolvedValue::Color(Rgb::new(0xfa, 0xca, 0xde))
        );
        assert_eq!(ResolvedValue::classify("123456"), ResolvedValue::Number(123456.0));
    }

    #[test]
    fn test_bare_hex_is_a_color_where_one_is_expected() {
        let resolution = |literal: &str| Resolution {
            value: ResolvedValue::classify(literal),
            literal: literal.to_string(),
            origin: None,
        };

        assert_eq!(resolution("336699").color(), Some(Rgb::new(0x33, 0x66, 0x99)));
        assert_eq!(resolution("facade").color(), Some(Rgb::new(0xfa, 0xca, 0xde)));
        assert_eq!(resolution("123abc").color(), Some(Rgb::new(0x12, 0x3a, 0xbc)));
        assert_eq!(resolution("123456").color(), None);
        assert_eq!(resolution("bold").color(), None);
    }

    #[test]
    fn test_to_css() {
        assert_eq!(ResolvedValue::classify("#ABCDEF").to_css(), "#abcdef");
        assert_eq!(ResolvedValue::classify("8px").to_css(), "8px");
        assert_eq!(ResolvedValue::classify("50%").to_css(), "0.5");
    }
}
