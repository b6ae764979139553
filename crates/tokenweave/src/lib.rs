// ABOUTME: Public entry point for the tokenweave engine
// ABOUTME: Re-exports the resolution and compliance API and provides the session root state

pub mod session;

pub use session::Session;

// Collaborator-facing operations
pub use tokenweave_core::{contrast_ratio, pick_aa_on_tone, resolve_reference, run_compliance_cascade};

pub use tokenweave_core::{
    AuditReport, AuditSeverity, BatchedWriter, CascadeError, CascadeOutcome, CascadeRequest,
    CascadeTrigger, ComplianceUpdater, CssVariableStore, EngineConfig, InMemoryCssStore,
    ResolveContext, ResolveError, ResolvedValue, Rgb, ThemeDocument, ThemeWrite, TokenDocument,
    TokenIndex, audit_theme, resolve, run_compliance_cascade_with,
};
pub use tokenweave_events::{Event, EventBus, EventHandler, HandlerBus, NullBus, RecordingBus, WarningSubject};
pub use tokenweave_logging::{LoggingConfig, init_logging, init_logging_with_config};
pub use tokenweave_types::{ColorRole, Direction, Emphasis, Mode, ParsedRef, ScaleLevel, TokenPath};
