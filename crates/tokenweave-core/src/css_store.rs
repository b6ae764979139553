// ABOUTME: CSS custom-property store capability injected into resolution and cascades
// ABOUTME: In-memory implementation plus the variable naming scheme for theme roles

use crate::parser::parse_css_var;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// Maximum `var()` hops followed by [`InMemoryCssStore::read_resolved`]
const MAX_VAR_HOPS: usize = 10;

/// Store of CSS custom properties shared with the presentation layer
pub trait CssVariableStore {
    /// Raw value as written, possibly `var(...)`
    fn read(&self, name: &str) -> Option<String>;

    /// Computed value with `var()` indirections followed
    fn read_resolved(&self, name: &str) -> Option<String>;

    /// Write a value; returns whether the stored value changed
    fn write(&self, name: &str, value: &str) -> bool;
}

impl<T: CssVariableStore + ?Sized> CssVariableStore for Arc<T> {
    fn read(&self, name: &str) -> Option<String> {
        (**self).read(name)
    }

    fn read_resolved(&self, name: &str) -> Option<String> {
        (**self).read_resolved(name)
    }

    fn write(&self, name: &str, value: &str) -> bool {
        (**self).write(name, value)
    }
}

/// Thread-safe in-memory store; clones share the same variables
#[derive(Debug, Clone, Default)]
pub struct InMemoryCssStore {
    variables: Arc<RwLock<HashMap<String, String>>>,
}

impl InMemoryCssStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_variables<I, K, V>(variables: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let store = Self::new();
        store.variables.write().extend(
            variables
                .into_iter()
                .map(|(name, value)| (name.into(), value.into())),
        );
        store
    }

    pub fn snapshot(&self) -> HashMap<String, String> {
        self.variables.read().clone()
    }

    pub fn len(&self) -> usize {
        self.variables.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.read().is_empty()
    }
}

impl CssVariableStore for InMemoryCssStore {
    fn read(&self, name: &str) -> Option<String> {
        self.variables.read().get(name).cloned()
    }

    fn read_resolved(&self, name: &str) -> Option<String> {
        let variables = self.variables.read();
        let mut current = variables.get(name)?.clone();

        for _ in 0..MAX_VAR_HOPS {
            let Some(var) = parse_css_var(&current) else {
                return Some(current);
            };
            current = match (variables.get(&var.name), var.fallback) {
                (Some(value), _) => value.clone(),
                (None, Some(fallback)) => fallback,
                (None, None) => return None,
            };
        }
        None
    }

    fn write(&self, name: &str, value: &str) -> bool {
        let mut variables = self.variables.write();
        if variables.get(name).is_some_and(|current| current == value) {
            return false;
        }
        variables.insert(name.to_string(), value.to_string());
        true
    }
}

/// CSS variable names for theme roles
pub mod names {
    use tokenweave_types::{ColorRole, Emphasis};

    pub fn core_color(prefix: &str, color: &str, role: ColorRole) -> String {
        format!("--{prefix}color-{color}-{}", role.key())
    }

    pub fn interactive(prefix: &str) -> String {
        format!("--{prefix}interactive")
    }

    pub fn layer_element_interactive(prefix: &str, layer: u8) -> String {
        format!("--{prefix}layer-{layer}-element-interactive-color")
    }

    pub fn emphasis_opacity(prefix: &str, emphasis: Emphasis) -> String {
        format!("--{prefix}text-{}-opacity", emphasis.key())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokenweave_types::{ColorRole, Emphasis};

    #[test]
    fn test_write_reports_changes() {
        let store = InMemoryCssStore::new();
        assert!(store.write("--interactive", "#0b5ed7"));
        assert!(!store.write("--interactive", "#0b5ed7"));
        assert!(store.write("--interactive", "#0a58ca"));
        assert_eq!(store.read("--interactive").as_deref(), Some("#0a58ca"));
    }

    #[test]
    fn test_read_resolved_follows_var_chains() {
        let store = InMemoryCssStore::with_variables([
            ("--a", "var(--b)"),
            ("--b", "var(--missing, #123456)"),
            ("--c", "#abcdef"),
        ]);
        assert_eq!(store.read("--a").as_deref(), Some("var(--b)"));
        assert_eq!(store.read_resolved("--a").as_deref(), Some("#123456"));
        assert_eq!(store.read_resolved("--c").as_deref(), Some("#abcdef"));
        assert_eq!(store.read_resolved("--nope"), None);
    }

    #[test]
    fn test_read_resolved_gives_up_on_loops() {
        let store = InMemoryCssStore::with_variables([("--a", "var(--b)"), ("--b", "var(--a)")]);
        assert_eq!(store.read_resolved("--a"), None);
    }

    #[test]
    fn test_clones_share_state() {
        let store = InMemoryCssStore::new();
        let shared = store.clone();
        shared.write("--x", "1");
        assert_eq!(store.read("--x").as_deref(), Some("1"));
    }

    #[test]
    fn test_variable_names() {
        assert_eq!(
            names::core_color("", "white", ColorRole::OnTone),
            "--color-white-on-tone"
        );
        assert_eq!(names::interactive("tw-"), "--tw-interactive");
        assert_eq!(
            names::layer_element_interactive("", 3),
            "--layer-3-element-interactive-color"
        );
        assert_eq!(
            names::emphasis_opacity("", Emphasis::High),
            "--text-high-emphasis-opacity"
        );
    }
}
