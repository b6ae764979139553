// ABOUTME: Error types for color parsing, reference resolution, cascades and config
// ABOUTME: Structured thiserror enums with constructor helpers and recoverability checks

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ColorError {
    #[error("Invalid hex color: {value:?}")]
    InvalidHex { value: String },
}

impl ColorError {
    pub fn invalid_hex<S: Into<String>>(value: S) -> Self {
        Self::InvalidHex {
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("Reference {reference} could not be resolved")]
    Unresolvable { reference: String },

    #[error("Reference {reference} exceeded depth {max_depth} or revisited a node")]
    CycleOrDepthExceeded { reference: String, max_depth: usize },
}

impl ResolveError {
    pub fn unresolvable<S: Into<String>>(reference: S) -> Self {
        Self::Unresolvable {
            reference: reference.into(),
        }
    }

    pub fn cycle<S: Into<String>>(reference: S, max_depth: usize) -> Self {
        Self::CycleOrDepthExceeded {
            reference: reference.into(),
            max_depth,
        }
    }

    /// A miss is an ordinary branch for callers probing aliases; a cycle is a
    /// defect in the document.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Unresolvable { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CascadeError {
    #[error("Cascade trigger value {value:?} for {target} does not resolve to a usable value")]
    InvalidTrigger { target: String, value: String },

    #[error("Theme document has no {mode} section")]
    MissingMode { mode: String },

    #[error("Theme document shape violation at {path}: {reason}")]
    DocumentShape { path: String, reason: String },

    #[error("Core color {name:?} not found in the theme")]
    UnknownColor { name: String },

    #[error("Resolution failed: {0}")]
    Resolve(#[from] ResolveError),

    #[error("Color error: {0}")]
    Color(#[from] ColorError),
}

impl CascadeError {
    pub fn invalid_trigger<T: Into<String>, V: Into<String>>(target: T, value: V) -> Self {
        Self::InvalidTrigger {
            target: target.into(),
            value: value.into(),
        }
    }

    pub fn document_shape<P: Into<String>, R: Into<String>>(path: P, reason: R) -> Self {
        Self::DocumentShape {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub fn unknown_color<S: Into<String>>(name: S) -> Self {
        Self::UnknownColor { name: name.into() }
    }

    /// A reference chain inside a slot looped or ran too deep
    pub fn is_reference_cycle(&self) -> bool {
        matches!(self, Self::Resolve(err) if !err.is_recoverable())
    }

    /// Errors that must abort the whole cascade without a write-back
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::DocumentShape { .. } | Self::InvalidTrigger { .. } | Self::MissingMode { .. }
        )
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse engine config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid engine config: {reason}")]
    Invalid { reason: String },
}

impl ConfigError {
    pub fn invalid<S: Into<String>>(reason: S) -> Self {
        Self::Invalid {
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_error_properties() {
        let miss = ResolveError::unresolvable("{tokens.colors.gray.100}");
        assert!(miss.is_recoverable());

        let cycle = ResolveError::cycle("{brand.a}", 10);
        assert!(!cycle.is_recoverable());
        assert!(cycle.to_string().contains("depth 10"));
    }

    #[test]
    fn test_cascade_error_fatality() {
        assert!(CascadeError::document_shape("light.palettes", "expected object").is_fatal());
        assert!(!CascadeError::unknown_color("teal").is_fatal());
        let wrapped: CascadeError = ResolveError::unresolvable("{brand.x}").into();
        assert!(!wrapped.is_fatal());
        assert!(!wrapped.is_reference_cycle());

        let looped: CascadeError = ResolveError::cycle("{brand.x}", 10).into();
        assert!(looped.is_reference_cycle());
        assert!(!looped.is_fatal());
    }
}
