// ABOUTME: Token and theme document snapshots wrapped around serde_json values
// ABOUTME: Mode-root lookup for both layouts, alias-aware node location, shape-checked writes

use crate::canonical::{canonical_theme_path, theme_path_variants};
use crate::error::CascadeError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tokenweave_types::Mode;

/// Key holding a leaf's value in both documents
pub const VALUE_KEY: &str = "$value";

/// Token document: categories of named literal values
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TokenDocument(Value);

impl TokenDocument {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    pub fn from_json_str(raw: &str) -> serde_json::Result<Self> {
        serde_json::from_str(raw).map(Self)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }
}

/// Theme document: per-mode semantic nodes holding literals or references
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ThemeDocument(Value);

impl Default for ThemeDocument {
    fn default() -> Self {
        Self(Value::Object(Map::new()))
    }
}

impl ThemeDocument {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    pub fn from_json_str(raw: &str) -> serde_json::Result<Self> {
        serde_json::from_str(raw).map(Self)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }

    /// Segments leading to the root of `mode`: `themes.<mode>` in the current
    /// layout, `<mode>` in the legacy one.
    pub fn mode_prefix(&self, mode: Mode) -> Option<Vec<String>> {
        if self
            .0
            .get("themes")
            .and_then(|themes| themes.get(mode.as_str()))
            .is_some()
        {
            return Some(vec!["themes".to_string(), mode.as_str().to_string()]);
        }
        self.0
            .get(mode.as_str())
            .map(|_| vec![mode.as_str().to_string()])
    }

    pub fn mode_root(&self, mode: Mode) -> Option<&Value> {
        let prefix = self.mode_prefix(mode)?;
        walk(&self.0, &prefix)
    }

    /// Find the node at `path` under `mode`, trying every legacy spelling.
    pub fn locate(&self, mode: Mode, path: &[String]) -> Option<(Vec<String>, &Value)> {
        let root = self.mode_root(mode)?;
        theme_path_variants(path)
            .into_iter()
            .find_map(|variant| walk(root, &variant).map(|node| (variant, node)))
    }

    pub fn node(&self, mode: Mode, path: &[String]) -> Option<&Value> {
        self.locate(mode, path).map(|(_, node)| node)
    }

    /// Raw (unresolved) value stored at `path`
    pub fn raw_value(&self, mode: Mode, path: &[String]) -> Option<String> {
        self.node(mode, path).and_then(leaf_raw)
    }

    /// Child keys of the object at `path`, in document order
    pub fn child_names(&self, mode: Mode, path: &[String]) -> Vec<String> {
        self.node(mode, path)
            .and_then(Value::as_object)
            .map(|map| map.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Overwrite the value at `path`, creating missing intermediate objects
    /// under the canonical spelling. Returns whether the stored value changed.
    pub fn set_value(&mut self, mode: Mode, path: &[String], value: &str) -> Result<bool, CascadeError> {
        let prefix = self
            .mode_prefix(mode)
            .ok_or_else(|| CascadeError::MissingMode {
                mode: mode.to_string(),
            })?;

        let target = match self.locate(mode, path) {
            Some((variant, _)) => variant,
            None => canonical_theme_path(path),
        };

        let full: Vec<String> = prefix.into_iter().chain(target).collect();
        let display = full.join(".");
        let (leaf_key, parents) = full
            .split_last()
            .ok_or_else(|| CascadeError::document_shape(&display, "empty path"))?;

        let mut cursor = &mut self.0;
        for segment in parents {
            let map = cursor.as_object_mut().ok_or_else(|| {
                CascadeError::document_shape(&display, format!("{segment:?} is not under an object"))
            })?;
            cursor = map
                .entry(segment.clone())
                .or_insert_with(|| Value::Object(Map::new()));
        }

        let parent = cursor
            .as_object_mut()
            .ok_or_else(|| CascadeError::document_shape(&display, "parent is not an object"))?;

        match parent.get_mut(leaf_key) {
            Some(Value::Object(leaf)) => {
                let changed = leaf.get(VALUE_KEY).and_then(Value::as_str) != Some(value);
                if changed {
                    leaf.insert(VALUE_KEY.to_string(), Value::String(value.to_string()));
                }
                Ok(changed)
            }
            Some(slot @ Value::String(_)) => {
                let changed = slot.as_str() != Some(value);
                *slot = Value::String(value.to_string());
                Ok(changed)
            }
            Some(_) => Err(CascadeError::document_shape(
                &display,
                "leaf is neither an object nor a string",
            )),
            None => {
                let mut leaf = Map::new();
                leaf.insert(VALUE_KEY.to_string(), Value::String(value.to_string()));
                parent.insert(leaf_key.clone(), Value::Object(leaf));
                Ok(true)
            }
        }
    }
}

/// Follow `path` through nested objects
pub fn walk<'a>(root: &'a Value, path: &[String]) -> Option<&'a Value> {
    path.iter().try_fold(root, |node, segment| node.get(segment.as_str()))
}

/// Literal carried by a leaf: a string, a number, or an object's `$value`
pub fn leaf_raw(node: &Value) -> Option<String> {
    match node {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Object(map) => map.get(VALUE_KEY).and_then(|inner| match inner {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canonical::segments;
    use serde_json::json;

    #[test]
    fn test_mode_prefix_for_both_layouts() {
        let current = ThemeDocument::new(json!({ "themes": { "light": {}, "dark": {} } }));
        assert_eq!(
            current.mode_prefix(Mode::Dark),
            Some(vec!["themes".to_string(), "dark".to_string()])
        );

        let legacy = ThemeDocument::new(json!({ "light": { "interactive": { "$value": "#0b5ed7" } } }));
        assert_eq!(legacy.mode_prefix(Mode::Light), Some(vec!["light".to_string()]));
        assert_eq!(legacy.mode_prefix(Mode::Dark), None);
        assert_eq!(
            legacy.raw_value(Mode::Light, &segments("interactive")),
            Some("#0b5ed7".to_string())
        );
    }

    #[test]
    fn test_locate_uses_legacy_spellings() {
        let theme = ThemeDocument::new(json!({
            "themes": { "light": {
                "palette": { "core": { "white": { "tone": { "$value": "#ffffff" } } } },
                "text": { "high-emphasis": { "$value": "0.87" } }
            } }
        }));

        let (found, _) = theme
            .locate(Mode::Light, &segments("palettes.core-colors.white.tone"))
            .unwrap();
        assert_eq!(found.join("."), "palette.core.white.tone");

        assert_eq!(
            theme.raw_value(Mode::Light, &segments("high-emphasis")),
            Some("0.87".to_string())
        );
    }

    #[test]
    fn test_set_value_overwrites_existing_spelling() {
        let mut theme = ThemeDocument::new(json!({
            "themes": { "light": { "palette": { "core": { "white": { "tone": { "$value": "#ffffff" } } } } } }
        }));

        let changed = theme
            .set_value(Mode::Light, &segments("palettes.core-colors.white.tone"), "#f5f5f0")
            .unwrap();
        assert!(changed);
        assert_eq!(
            theme.as_value()["themes"]["light"]["palette"]["core"]["white"]["tone"]["$value"],
            "#f5f5f0"
        );

        let unchanged = theme
            .set_value(Mode::Light, &segments("palettes.core-colors.white.tone"), "#f5f5f0")
            .unwrap();
        assert!(!unchanged);
    }

    #[test]
    fn test_set_value_creates_canonical_nodes() {
        let mut theme = ThemeDocument::new(json!({ "themes": { "light": {} } }));
        theme
            .set_value(Mode::Light, &segments("layers.layer-2.element-interactive"), "#123456")
            .unwrap();
        assert_eq!(
            theme.as_value()["themes"]["light"]["layers"]["layer-2"]["element-interactive"]["$value"],
            "#123456"
        );
    }

    #[test]
    fn test_set_value_rejects_shape_violations() {
        let mut theme = ThemeDocument::new(json!({ "themes": { "light": { "layers": "flat" } } }));
        let err = theme
            .set_value(Mode::Light, &segments("layers.layer-0.surface"), "#ffffff")
            .unwrap_err();
        assert!(matches!(err, CascadeError::DocumentShape { .. }));

        let mut missing = ThemeDocument::new(json!({ "themes": { "light": {} } }));
        let err = missing
            .set_value(Mode::Dark, &segments("interactive"), "#ffffff")
            .unwrap_err();
        assert!(matches!(err, CascadeError::MissingMode { .. }));
    }

    #[test]
    fn test_leaf_raw() {
        assert_eq!(leaf_raw(&json!("#fff000")), Some("#fff000".to_string()));
        assert_eq!(leaf_raw(&json!({ "$value": 0.6 })), Some("0.6".to_string()));
        assert_eq!(leaf_raw(&json!({ "tone": "x" })), None);
    }
}
