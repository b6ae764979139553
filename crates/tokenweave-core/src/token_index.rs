// ABOUTME: Flattened O(1) lookup over the token document
// ABOUTME: Resolves scale aliases once at build time and keeps ordered color families

use crate::canonical::{is_color_category, segments, token_category};
use crate::color_math::parse_hex;
use crate::document::{TokenDocument, VALUE_KEY, leaf_raw};
use serde_json::{Map, Value};
use std::collections::{HashMap, HashSet};
use tokenweave_logging::{debug, warn};
use tokenweave_types::{ScaleLevel, TokenPath};

const ALIAS_KEY: &str = "alias";

/// One color family with its levels ordered lightest to darkest
#[derive(Debug, Clone, PartialEq)]
pub struct ColorFamily {
    pub scale_key: String,
    pub alias: Option<String>,
    pub levels: Vec<(ScaleLevel, String)>,
}

impl ColorFamily {
    pub fn hex_at(&self, level: ScaleLevel) -> Option<&str> {
        self.position(level)
            .ok()
            .map(|index| self.levels[index].1.as_str())
    }

    /// `Ok(index)` when the level exists, `Err(insertion_point)` otherwise
    pub fn position(&self, level: ScaleLevel) -> Result<usize, usize> {
        self.levels.binary_search_by_key(&level, |(l, _)| *l)
    }

    pub fn token_path(&self, level: ScaleLevel) -> TokenPath {
        TokenPath::new(self.scale_key.clone(), level)
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }
}

/// Lookup structure built from one token document
#[derive(Debug, Clone, Default)]
pub struct TokenIndex {
    entries: HashMap<String, String>,
    families: Vec<ColorFamily>,
    by_scale_key: HashMap<String, usize>,
    by_alias: HashMap<String, usize>,
    ambiguous_aliases: HashSet<String>,
    generation: u64,
}

impl TokenIndex {
    pub fn build(document: &TokenDocument) -> Self {
        Self::build_with_generation(document, 0)
    }

    /// Build and tag the index with the document generation it reflects
    pub fn build_with_generation(document: &TokenDocument, generation: u64) -> Self {
        let mut index = TokenIndex {
            generation,
            ..Default::default()
        };

        let Some(root) = document.as_value().as_object() else {
            warn!("Token document root is not an object; index is empty");
            return index;
        };

        for (category, node) in root {
            if is_color_category(category) {
                if let Some(families) = node.as_object() {
                    index.add_colors(families);
                }
            } else {
                let mut prefix = vec![token_category(category).to_string()];
                index.add_generic(&mut prefix, node);
            }
        }

        debug!(
            entries = index.entries.len(),
            families = index.families.len(),
            ambiguous = index.ambiguous_aliases.len(),
            generation,
            "Token index built"
        );
        index
    }

    fn add_colors(&mut self, families: &Map<String, Value>) {
        for (family_key, node) in families {
            let Some(object) = node.as_object().filter(|o| !o.contains_key(VALUE_KEY)) else {
                // Legacy flat single color
                if let Some(raw) = leaf_raw(node) {
                    self.entries.insert(format!("colors/{family_key}"), raw);
                }
                continue;
            };

            let alias = object
                .get(ALIAS_KEY)
                .and_then(Value::as_str)
                .map(str::to_string);

            let mut levels: Vec<(ScaleLevel, String)> = Vec::new();
            for (level_key, level_node) in object {
                if level_key == ALIAS_KEY || level_key.starts_with('$') {
                    continue;
                }
                let Some(raw) = leaf_raw(level_node) else {
                    continue;
                };
                match ScaleLevel::parse(level_key) {
                    Some(level) if !levels.iter().any(|(l, _)| *l == level) => {
                        levels.push((level, raw));
                    }
                    Some(level) => {
                        debug!(family = %family_key, %level, "Duplicate level spelling ignored");
                    }
                    None => {
                        self.entries
                            .insert(format!("colors/{family_key}/{level_key}"), raw);
                    }
                }
            }
            levels.sort_by_key(|(level, _)| *level);

            for (level, hex) in &levels {
                self.entries
                    .insert(format!("colors/{family_key}/{level}"), hex.clone());
            }

            let family_index = self.families.len();
            self.by_scale_key.insert(family_key.clone(), family_index);

            if let Some(alias) = &alias
                && alias != family_key
            {
                self.register_alias(alias, family_index);
            }

            self.families.push(ColorFamily {
                scale_key: family_key.clone(),
                alias,
                levels,
            });
        }
    }

    fn register_alias(&mut self, alias: &str, family_index: usize) {
        if self.ambiguous_aliases.contains(alias) {
            return;
        }
        match self.by_alias.get(alias) {
            Some(existing) if *existing != family_index => {
                warn!(alias, "Color alias claimed by more than one scale; lookups through it will fail");
                self.by_alias.remove(alias);
                self.ambiguous_aliases.insert(alias.to_string());
            }
            Some(_) => {}
            None => {
                self.by_alias.insert(alias.to_string(), family_index);
            }
        }
    }

    fn add_generic(&mut self, prefix: &mut Vec<String>, node: &Value) {
        match node {
            Value::Object(map) if !map.contains_key(VALUE_KEY) => {
                for (key, child) in map {
                    if key.starts_with('$') {
                        continue;
                    }
                    prefix.push(key.clone());
                    self.add_generic(prefix, child);
                    prefix.pop();
                }
            }
            leaf => {
                if let Some(raw) = leaf_raw(leaf) {
                    self.entries.insert(prefix.join("/"), raw);
                }
            }
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Literal stored at a dotted or slashed path.
    ///
    /// Accepts `color` or `colors`, a scale key or its alias, and any level
    /// spelling (`000`, `50`, `050`).
    pub fn get(&self, path: &str) -> Option<&str> {
        self.get_segments(&segments(path))
    }

    pub fn get_segments(&self, path: &[String]) -> Option<&str> {
        let key = self.normalize_key(path)?;
        self.entries.get(&key).map(String::as_str)
    }

    pub(crate) fn normalize_key(&self, path: &[String]) -> Option<String> {
        let (category, rest) = path.split_first()?;
        let category = token_category(category);
        if rest.is_empty() {
            return None;
        }

        if category != "colors" {
            return Some(format!("{category}/{}", rest.join("/")));
        }

        match rest {
            [family, level] => {
                let scale_key = self.scale_key_for(family)?;
                let level = ScaleLevel::parse(level)
                    .map(|l| l.to_string())
                    .unwrap_or_else(|| level.clone());
                Some(format!("colors/{scale_key}/{level}"))
            }
            _ => Some(format!("colors/{}", rest.join("/"))),
        }
    }

    fn scale_key_for<'a>(&'a self, family: &'a str) -> Option<&'a str> {
        if self.by_scale_key.contains_key(family) {
            return Some(family);
        }
        if self.ambiguous_aliases.contains(family) {
            debug!(alias = family, "Lookup through ambiguous alias refused");
            return None;
        }
        match self.by_alias.get(family) {
            Some(index) => Some(self.families[*index].scale_key.as_str()),
            // Unknown families still produce a key so legacy entries can match
            None => Some(family),
        }
    }

    /// Canonical coordinates of a color token path, if it names a known level
    pub fn token_path(&self, path: &[String]) -> Option<TokenPath> {
        let (category, rest) = path.split_first()?;
        if !is_color_category(category) {
            return None;
        }
        let [family, level] = rest else {
            return None;
        };
        let family = self.family(family)?;
        let level = ScaleLevel::parse(level)?;
        family.hex_at(level)?;
        Some(family.token_path(level))
    }

    /// Ordered family by scale key or unambiguous alias
    pub fn family(&self, key: &str) -> Option<&ColorFamily> {
        if let Some(index) = self.by_scale_key.get(key) {
            return self.families.get(*index);
        }
        if self.ambiguous_aliases.contains(key) {
            debug!(alias = key, "Family lookup through ambiguous alias refused");
            return None;
        }
        self.by_alias
            .get(key)
            .and_then(|index| self.families.get(*index))
    }

    pub fn families(&self) -> &[ColorFamily] {
        &self.families
    }

    /// First token holding `hex`, in build order and lightest level first
    pub fn find_hex(&self, hex: &str) -> Option<TokenPath> {
        let target = parse_hex(hex).ok()?;
        self.families.iter().find_map(|family| {
            family
                .levels
                .iter()
                .find(|(_, value)| parse_hex(value).is_ok_and(|rgb| rgb == target))
                .map(|(level, _)| family.token_path(*level))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn document() -> TokenDocument {
        TokenDocument::new(json!({
            "colors": {
                "scale-01": {
                    "alias": "gray",
                    "000": { "$value": "#f8f9fa" },
                    "100": { "$value": "#e9ecef" },
                    "1000": { "$value": "#000000" }
                },
                "scale-05": {
                    "alias": "cornflower",
                    "300": { "$value": "#336699" },
                    "600": { "$value": "#1f3d5c" }
                }
            },
            "opacity": { "high": { "$value": "87%" }, "low": "0.6" },
            "dimensions": { "spacing": { "sm": { "$value": "8px" } } }
        }))
    }

    #[test]
    fn test_lookup_by_scale_key_and_alias() {
        let index = TokenIndex::build(&document());
        assert_eq!(index.get("colors/scale-05/300"), Some("#336699"));
        assert_eq!(index.get("colors.cornflower.300"), Some("#336699"));
        assert_eq!(index.get("color/cornflower/300"), Some("#336699"));
    }

    #[test]
    fn test_level_normalization() {
        let index = TokenIndex::build(&document());
        assert_eq!(index.get("colors/gray/000"), Some("#f8f9fa"));
        assert_eq!(index.get("colors/gray/050"), Some("#f8f9fa"));
        assert_eq!(index.get("colors/gray/50"), Some("#f8f9fa"));
        assert_eq!(index.get("colors/gray/1000"), Some("#000000"));
    }

    #[test]
    fn test_generic_categories() {
        let index = TokenIndex::build(&document());
        assert_eq!(index.get("opacity/high"), Some("87%"));
        assert_eq!(index.get("opacities.low"), Some("0.6"));
        assert_eq!(index.get("dimensions/spacing/sm"), Some("8px"));
        assert_eq!(index.get("dimension.spacing.sm"), Some("8px"));
        assert_eq!(index.get("opacity/medium"), None);
    }

    #[test]
    fn test_family_is_ordered() {
        let index = TokenIndex::build(&document());
        let family = index.family("gray").unwrap();
        assert_eq!(family.scale_key, "scale-01");
        let levels: Vec<String> = family.levels.iter().map(|(l, _)| l.to_string()).collect();
        assert_eq!(levels, vec!["050", "100", "1000"]);
        assert_eq!(family.position(ScaleLevel::from_number(500)), Err(2));
    }

    #[test]
    fn test_ambiguous_alias_fails_lookup() {
        let index = TokenIndex::build(&TokenDocument::new(json!({
            "colors": {
                "scale-01": { "alias": "blue", "500": { "$value": "#0000ff" } },
                "scale-02": { "alias": "blue", "500": { "$value": "#0000aa" } }
            }
        })));
        assert_eq!(index.get("colors/blue/500"), None);
        assert!(index.family("blue").is_none());
        assert_eq!(index.get("colors/scale-02/500"), Some("#0000aa"));
    }

    #[test]
    fn test_legacy_flat_layout() {
        let index = TokenIndex::build(&TokenDocument::new(json!({
            "color": {
                "gray": { "100": "#eeeeee", "900": { "$value": "#111111" } },
                "white": "#ffffff"
            }
        })));
        assert_eq!(index.get("colors/gray/100"), Some("#eeeeee"));
        assert_eq!(index.get("colors/gray/900"), Some("#111111"));
        assert_eq!(index.get("color/white"), Some("#ffffff"));
        assert_eq!(index.family("gray").unwrap().levels.len(), 2);
    }

    #[test]
    fn test_find_hex_and_token_path() {
        let index = TokenIndex::build(&document());
        let found = index.find_hex("#336699").unwrap();
        assert_eq!(found.key(), "colors/scale-05/300");
        assert_eq!(index.find_hex("#ABCDEF"), None);

        let path = index
            .token_path(&segments("colors.cornflower.600"))
            .unwrap();
        assert_eq!(path.to_reference(), "{tokens.colors.scale-05.600}");
    }

    #[test]
    fn test_rebuild_reflects_new_document() {
        let first = TokenIndex::build_with_generation(&document(), 1);
        let second = TokenIndex::build_with_generation(
            &TokenDocument::new(json!({ "colors": { "scale-05": { "alias": "teal", "300": "#008080" } } })),
            2,
        );
        assert_eq!(first.get("colors/cornflower/300"), Some("#336699"));
        assert_eq!(second.get("colors/cornflower/300"), None);
        assert_eq!(second.get("colors/teal/300"), Some("#008080"));
        assert_eq!(second.generation(), 2);
    }
}
