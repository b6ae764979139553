// ABOUTME: Session root state owning the token document, index and theme snapshot
// ABOUTME: Commits cascades through one batched CSS writer and swaps in the new snapshot

use anyhow::{Context, Result};
use std::path::Path;
use std::sync::Arc;
use tokenweave_core::{
    AuditReport, BatchedWriter, CascadeError, CascadeOutcome, CascadeRequest, CascadeTrigger,
    ComplianceUpdater, CssVariableStore, EngineConfig, InMemoryCssStore, ResolveContext,
    ResolvedValue, Rgb, ThemeDocument, TokenDocument, TokenIndex, audit_theme, resolve_color, resolve_reference,
};
use tokenweave_events::{EventBus, NullBus};
use tokenweave_logging::{debug, info};
use tokenweave_types::Mode;

/// Root state for one editing session.
///
/// Snapshots are immutable and shared through `Arc`; a cascade produces a new
/// theme snapshot which replaces the current one, so readers holding an older
/// snapshot keep a consistent view.
pub struct Session<S = InMemoryCssStore, B = NullBus>
where
    S: CssVariableStore,
    B: EventBus,
{
    mode: Mode,
    tokens: Arc<TokenDocument>,
    index: Arc<TokenIndex>,
    theme: Arc<ThemeDocument>,
    writer: BatchedWriter<S, B>,
    updater: ComplianceUpdater,
}

impl Session {
    /// Session backed by an in-memory CSS store with no listeners
    pub fn in_memory(tokens: TokenDocument, theme: ThemeDocument, config: EngineConfig) -> Self {
        Session::new(tokens, theme, config, InMemoryCssStore::new(), NullBus)
    }
}

impl<S: CssVariableStore, B: EventBus> Session<S, B> {
    pub fn new(tokens: TokenDocument, theme: ThemeDocument, config: EngineConfig, store: S, bus: B) -> Self {
        let index = TokenIndex::build_with_generation(&tokens, 0);
        info!(
            tokens = index.len(),
            families = index.families().len(),
            mode = %config.default_mode,
            "Session started"
        );

        Self {
            mode: config.default_mode,
            tokens: Arc::new(tokens),
            index: Arc::new(index),
            theme: Arc::new(theme),
            writer: BatchedWriter::new(store, bus),
            updater: ComplianceUpdater::new(config),
        }
    }

    /// Read both documents from JSON files
    pub fn load(
        tokens_path: &Path,
        theme_path: &Path,
        config: EngineConfig,
        store: S,
        bus: B,
    ) -> Result<Self> {
        let tokens = read_json(tokens_path, TokenDocument::from_json_str)
            .with_context(|| format!("Failed to load token document: {}", tokens_path.display()))?;
        let theme = read_json(theme_path, ThemeDocument::from_json_str)
            .with_context(|| format!("Failed to load theme document: {}", theme_path.display()))?;
        Ok(Self::new(tokens, theme, config, store, bus))
    }

    pub fn config(&self) -> &EngineConfig {
        self.updater.config()
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: Mode) {
        if self.mode != mode {
            debug!(from = %self.mode, to = %mode, "Session mode changed");
            self.mode = mode;
        }
    }

    pub fn tokens(&self) -> Arc<TokenDocument> {
        Arc::clone(&self.tokens)
    }

    pub fn index(&self) -> Arc<TokenIndex> {
        Arc::clone(&self.index)
    }

    /// Current theme snapshot
    pub fn theme(&self) -> Arc<ThemeDocument> {
        Arc::clone(&self.theme)
    }

    /// Generation of the token document the index reflects
    pub fn generation(&self) -> u64 {
        self.index.generation()
    }

    pub fn writer(&self) -> &BatchedWriter<S, B> {
        &self.writer
    }

    /// Install a new token document and rebuild the index for it
    pub fn replace_tokens(&mut self, tokens: TokenDocument) {
        let generation = self.index.generation() + 1;
        let index = TokenIndex::build_with_generation(&tokens, generation);
        info!(generation, tokens = index.len(), "Token document replaced");
        self.tokens = Arc::new(tokens);
        self.index = Arc::new(index);
    }

    pub fn replace_theme(&mut self, theme: ThemeDocument) {
        debug!("Theme document replaced");
        self.theme = Arc::new(theme);
    }

    /// Resolution context over the current snapshots and the CSS store
    pub fn context(&self) -> ResolveContext<'_> {
        ResolveContext::new(self.mode, &self.index, &self.theme)
            .with_css(self.writer.store())
            .with_max_depth(self.config().max_depth)
    }

    pub fn resolve(&self, raw: &str) -> Option<ResolvedValue> {
        resolve_reference(raw, &self.context())
    }

    pub fn resolve_color(&self, raw: &str) -> Option<Rgb> {
        resolve_color(raw, &self.context())
    }

    /// Run a cascade in the current mode and install its snapshot
    pub fn cascade(&mut self, trigger: CascadeTrigger) -> Result<CascadeOutcome, CascadeError> {
        let request = CascadeRequest {
            mode: self.mode,
            trigger,
        };
        self.apply(&request)
    }

    /// Run a cascade for an explicit mode and install its snapshot
    pub fn apply(&mut self, request: &CascadeRequest) -> Result<CascadeOutcome, CascadeError> {
        let outcome = self
            .updater
            .apply(&self.writer, request, &self.index, &self.theme)?;
        if outcome.theme_changed() {
            self.theme = Arc::new(outcome.updated_theme.clone());
        }
        Ok(outcome)
    }

    pub fn audit(&self) -> Result<AuditReport, CascadeError> {
        audit_theme(self.mode, &self.index, &self.theme, self.config())
    }
}

fn read_json<T>(path: &Path, parse: fn(&str) -> serde_json::Result<T>) -> Result<T> {
    let raw = std::fs::read_to_string(path).context("Failed to read file")?;
    parse(&raw).context("Failed to parse JSON")
}
