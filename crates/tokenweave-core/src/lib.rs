// ABOUTME: Token reference resolution and WCAG compliance engine
// ABOUTME: Indexes token documents, resolves references and runs compliance cascades

pub mod audit;
pub mod batch;
pub mod canonical;
pub mod color_math;
pub mod compliance;
pub mod config;
pub mod css_store;
pub mod document;
pub mod error;
pub mod parser;
pub mod resolver;
pub mod stepper;
pub mod token_index;

#[cfg(test)]
mod test_utils;

// Color math exports
pub use color_math::{
    ContrastRatios, Rgb, WcagLevel, composite_over, contrast_ratio, contrast_ratio_at,
    contrast_ratio_rgb, meets, parse_hex, pick_aa_on_tone, relative_luminance,
};

// Document and index exports
pub use document::{ThemeDocument, TokenDocument};
pub use token_index::{ColorFamily, TokenIndex};

// Resolution exports
pub use parser::{is_reference, parse, parse_css_var};
pub use resolver::{
    DEFAULT_MAX_DEPTH, ResolveContext, Resolution, ResolvedValue, resolve, resolve_color,
    resolve_dimension, resolve_opacity, resolve_reference,
};

// Compliance exports
pub use audit::{AuditEntry, AuditReport, AuditSeverity, PairKind, audit_theme};
pub use compliance::{
    CascadeOutcome, CascadeRequest, CascadeTrigger, CascadeWarning, ComplianceUpdater, ThemeWrite,
    run_compliance_cascade, run_compliance_cascade_with,
};
pub use stepper::{
    CandidateSource, Compliance, ScaleMatch, SearchStart, StepOutcome, derive_hover,
    find_compliant_in_family, make_compliant, step_until_compliant,
};

// Storage and configuration exports
pub use batch::{BatchGuard, BatchState, BatchedWriter};
pub use config::{CssConfig, EngineConfig};
pub use css_store::{CssVariableStore, InMemoryCssStore};
pub use error::{CascadeError, ColorError, ConfigError, ResolveError};
