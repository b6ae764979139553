// ABOUTME: Compliance cascade keeping on-tone and interactive colors above the contrast threshold
// ABOUTME: Plans theme and CSS writes on a deep copy, then commits them through one batch

use crate::batch::BatchedWriter;
use crate::color_math::{Rgb, contrast_ratio_at, contrast_ratio_rgb, meets, parse_hex_or_black};
use crate::config::EngineConfig;
use crate::css_store::{CssVariableStore, names};
use crate::document::ThemeDocument;
use crate::error::{CascadeError, ColorError, ResolveError};
use crate::resolver::{ResolveContext, resolve, resolve_opacity};
use crate::stepper::{SearchStart, StepOutcome, make_compliant_at, step_in_family};
use crate::token_index::TokenIndex;
use serde::Serialize;
use std::fmt;
use tokenweave_events::{Event, EventBus, WarningSubject};
use tokenweave_logging::{OperationTimer, debug, error, info, warn};
use tokenweave_types::{ColorRole, Direction, Emphasis, Mode, TokenPath};

/// Core color whose tone change also re-checks every on-tone that follows it
pub const WHITE_COLOR: &str = "white";

pub(crate) const PALETTES: &str = "palettes";
pub(crate) const CORE_COLORS: &str = "core-colors";

/// The edit that starts a cascade
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CascadeTrigger {
    /// A core color's tone was set to a literal or a reference
    ToneChanged { color: String, tone: String },
    /// The global interactive color changed
    InteractiveChanged { value: String },
    /// A text-emphasis opacity changed
    EmphasisChanged { emphasis: Emphasis, value: String },
}

impl fmt::Display for CascadeTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CascadeTrigger::ToneChanged { color, .. } => write!(f, "tone_changed:{color}"),
            CascadeTrigger::InteractiveChanged { .. } => f.write_str("interactive_changed"),
            CascadeTrigger::EmphasisChanged { emphasis, .. } => {
                write!(f, "emphasis_changed:{}", emphasis.key())
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CascadeRequest {
    pub mode: Mode,
    pub trigger: CascadeTrigger,
}

impl CascadeRequest {
    pub fn tone_changed(mode: Mode, color: impl Into<String>, tone: impl Into<String>) -> Self {
        Self {
            mode,
            trigger: CascadeTrigger::ToneChanged {
                color: color.into(),
                tone: tone.into(),
            },
        }
    }

    pub fn interactive_changed(mode: Mode, value: impl Into<String>) -> Self {
        Self {
            mode,
            trigger: CascadeTrigger::InteractiveChanged {
                value: value.into(),
            },
        }
    }

    pub fn emphasis_changed(mode: Mode, emphasis: Emphasis, value: impl Into<String>) -> Self {
        Self {
            mode,
            trigger: CascadeTrigger::EmphasisChanged {
                emphasis,
                value: value.into(),
            },
        }
    }
}

/// One overwritten theme node
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ThemeWrite {
    pub path: String,
    pub old: Option<String>,
    pub new: String,
}

/// A committed value that does not meet the threshold
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CascadeWarning {
    pub subject: WarningSubject,
    pub foreground: String,
    pub background: String,
    pub ratio: f64,
    pub threshold: f64,
}

impl CascadeWarning {
    pub fn to_event(&self) -> Event {
        Event::ComplianceWarning {
            subject: self.subject.clone(),
            foreground: self.foreground.clone(),
            background: self.background.clone(),
            ratio: self.ratio,
            threshold: self.threshold,
        }
    }
}

/// Everything one cascade decided, ready to be committed
#[derive(Debug, Clone, PartialEq)]
pub struct CascadeOutcome {
    pub updated_theme: ThemeDocument,
    /// CSS variables in first-write order, last value wins
    pub written_css_vars: Vec<(String, String)>,
    pub theme_writes: Vec<ThemeWrite>,
    pub warnings: Vec<CascadeWarning>,
}

impl CascadeOutcome {
    pub fn theme_changed(&self) -> bool {
        !self.theme_writes.is_empty()
    }
}

/// Resolved color held by a theme slot
#[derive(Debug, Clone)]
struct ColorSlot {
    rgb: Rgb,
    origin: Option<TokenPath>,
}

pub(crate) fn core_group(color: &str) -> Vec<String> {
    vec![PALETTES.to_string(), CORE_COLORS.to_string(), color.to_string()]
}

pub(crate) fn core_path(color: &str, role: ColorRole) -> Vec<String> {
    let mut path = core_group(color);
    path.push(role.key().to_string());
    path
}

pub(crate) fn layer_path(layer: u8, leaf: &str) -> Vec<String> {
    vec!["layers".to_string(), format!("layer-{layer}"), leaf.to_string()]
}

pub(crate) fn interactive_path() -> Vec<String> {
    vec!["interactive".to_string()]
}

pub(crate) fn emphasis_path(emphasis: Emphasis) -> Vec<String> {
    vec!["text".to_string(), emphasis.key().to_string()]
}

struct Cascade<'a> {
    mode: Mode,
    index: &'a TokenIndex,
    original: &'a ThemeDocument,
    config: &'a EngineConfig,
    working: ThemeDocument,
    css_writes: Vec<(String, String)>,
    theme_writes: Vec<ThemeWrite>,
    warnings: Vec<CascadeWarning>,
}

impl<'a> Cascade<'a> {
    fn new(mode: Mode, index: &'a TokenIndex, original: &'a ThemeDocument, config: &'a EngineConfig) -> Self {
        Self {
            mode,
            index,
            original,
            config,
            working: original.clone(),
            css_writes: Vec::new(),
            theme_writes: Vec::new(),
            warnings: Vec::new(),
        }
    }

    fn working_ctx(&self) -> ResolveContext<'_> {
        ResolveContext::new(self.mode, self.index, &self.working).with_max_depth(self.config.max_depth)
    }

    fn original_ctx(&self) -> ResolveContext<'a> {
        ResolveContext::new(self.mode, self.index, self.original).with_max_depth(self.config.max_depth)
    }

    fn slot_in(ctx: &ResolveContext<'_>, path: &[String]) -> Result<ColorSlot, CascadeError> {
        let raw = ctx
            .theme
            .raw_value(ctx.mode, path)
            .ok_or_else(|| ResolveError::unresolvable(path.join(".")))?;

        let resolution = resolve(&raw, ctx)?;
        let rgb = resolution
            .color()
            .ok_or_else(|| ColorError::invalid_hex(resolution.literal.clone()))?;
        Ok(ColorSlot {
            rgb,
            origin: resolution.origin,
        })
    }

    fn color_slot(&self, path: &[String]) -> Result<ColorSlot, CascadeError> {
        Self::slot_in(&self.working_ctx(), path)
    }

    fn original_slot(&self, path: &[String]) -> Result<ColorSlot, CascadeError> {
        Self::slot_in(&self.original_ctx(), path)
    }

    /// Family position a replacement search starts from
    fn search_start(&self, slot: &ColorSlot) -> Option<SearchStart<'a>> {
        let index = self.index;
        let token = slot
            .origin
            .clone()
            .or_else(|| index.find_hex(&slot.rgb.to_hex()))?;
        index.family(&token.scale_key).map(|family| SearchStart {
            family,
            level: token.level,
        })
    }

    fn core_color_names(&self) -> Vec<String> {
        self.working
            .child_names(self.mode, &[PALETTES.to_string(), CORE_COLORS.to_string()])
            .into_iter()
            .filter(|name| !name.starts_with('$'))
            .collect()
    }

    fn write_theme(&mut self, path: &[String], value: &str) -> Result<bool, CascadeError> {
        let old = self.working.raw_value(self.mode, path);
        let changed = self.working.set_value(self.mode, path, value)?;
        if changed {
            let path = path.join(".");
            debug!(path = %path, old = ?old, new = value, "Theme node rewritten");
            self.theme_writes.push(ThemeWrite {
                path,
                old,
                new: value.to_string(),
            });
        }
        Ok(changed)
    }

    fn write_css(&mut self, name: String, value: String) {
        match self.css_writes.iter_mut().find(|(queued, _)| *queued == name) {
            Some(entry) => entry.1 = value,
            None => self.css_writes.push((name, value)),
        }
    }

    fn warn_non_compliant(&mut self, subject: WarningSubject, foreground: &str, background: Rgb, ratio: f64) {
        warn!(
            subject = ?subject,
            foreground,
            background = %background,
            ratio,
            threshold = self.config.min_contrast,
            "No compliant candidate; keeping best effort"
        );
        self.warnings.push(CascadeWarning {
            subject,
            foreground: foreground.to_string(),
            background: background.to_hex(),
            ratio,
            threshold: self.config.min_contrast,
        });
    }

    /// Per-slot failures are logged and leave the prior value; fatal errors abort.
    fn guarded(&self, subject: &str, result: Result<(), CascadeError>) -> Result<(), CascadeError> {
        match result {
            Ok(()) => Ok(()),
            Err(err) if err.is_fatal() => Err(err),
            Err(err) if err.is_reference_cycle() => {
                error!(subject, error = %err, "Reference chain aborted; prior value kept");
                Ok(())
            }
            Err(err) => {
                warn!(subject, error = %err, "Compliance update skipped; prior value kept");
                Ok(())
            }
        }
    }

    /// Keep `color`'s `role` value if it meets the threshold against
    /// `background`, otherwise replace it via the fallback ladder.
    fn revalidate(&mut self, color: &str, role: ColorRole, background: Rgb, alpha: f64) -> Result<(), CascadeError> {
        let path = core_path(color, role);
        if self.working.node(self.mode, &path).is_none() {
            debug!(color, role = %role, "No such slot; nothing to validate");
            return Ok(());
        }

        let threshold = self.config.min_contrast;
        let css_name = names::core_color(&self.config.css.prefix, color, role);
        let slot = self.color_slot(&path)?;
        let ratio = contrast_ratio_at(slot.rgb, background, alpha);

        if meets(ratio, threshold) {
            debug!(color, role = %role, ratio, "Current value still compliant");
            self.write_css(css_name, slot.rgb.to_hex());
            return Ok(());
        }

        let start = self.search_start(&slot);
        let compliance = make_compliant_at(start, &background.to_hex(), threshold, alpha);
        let replacement = compliance
            .token
            .as_ref()
            .map_or_else(|| compliance.hex.clone(), TokenPath::to_reference);

        debug!(
            color,
            role = %role,
            from = %slot.rgb,
            to = %compliance.hex,
            source = ?compliance.source,
            "Replacing non-compliant value"
        );
        self.write_theme(&path, &replacement)?;
        self.write_css(css_name, compliance.hex.clone());

        if !compliance.compliant {
            let subject = WarningSubject::CoreColor {
                name: color.to_string(),
                role,
            };
            self.warn_non_compliant(subject, &compliance.hex, background, compliance.ratio);
        }
        Ok(())
    }

    fn tone_changed(&mut self, color: &str, tone: &str) -> Result<(), CascadeError> {
        if self.working.node(self.mode, &core_group(color)).is_none() {
            return Err(CascadeError::unknown_color(color));
        }

        let tone_path = core_path(color, ColorRole::Tone);
        let old_white = if color == WHITE_COLOR {
            match self.original_slot(&tone_path) {
                Ok(slot) => Some(slot),
                Err(err) => {
                    debug!(error = %err, "Previous white tone unresolved; dependents not tracked");
                    None
                }
            }
        } else {
            None
        };

        self.write_theme(&tone_path, tone)?;
        let new_tone = self.color_slot(&tone_path).map_err(|err| {
            debug!(error = %err, "New tone does not resolve to a color");
            CascadeError::invalid_trigger(tone_path.join("."), tone)
        })?;
        self.write_css(
            names::core_color(&self.config.css.prefix, color, ColorRole::Tone),
            new_tone.rgb.to_hex(),
        );

        for role in [ColorRole::Interactive, ColorRole::OnTone] {
            let result = self.revalidate(color, role, new_tone.rgb, 1.0);
            self.guarded(&format!("{color}.{role}"), result)?;
        }

        if let Some(old_white) = old_white {
            self.refresh_white_dependents(&old_white)?;
        }
        Ok(())
    }

    /// Queue a slot's current value as CSS without touching its theme node.
    fn republish(&mut self, color: &str, role: ColorRole) -> Result<(), CascadeError> {
        let path = core_path(color, role);
        if self.working.node(self.mode, &path).is_none() {
            return Ok(());
        }
        let slot = self.color_slot(&path)?;
        self.write_css(names::core_color(&self.config.css.prefix, color, role), slot.rgb.to_hex());
        Ok(())
    }

    /// Re-check on-tones that followed the previous white. Every other on-tone
    /// keeps its node and has its current value republished, so repeating the
    /// same cascade writes the same CSS variables.
    fn refresh_white_dependents(&mut self, old_white: &ColorSlot) -> Result<(), CascadeError> {
        for name in self.core_color_names() {
            if name == WHITE_COLOR {
                continue;
            }

            let on_tone_path = core_path(&name, ColorRole::OnTone);
            let followed_white = match self.original_slot(&on_tone_path) {
                Ok(previous) => {
                    previous.rgb == old_white.rgb
                        || (previous.origin.is_some() && previous.origin == old_white.origin)
                }
                Err(err) => {
                    debug!(color = %name, error = %err, "On-tone unresolved before the cascade");
                    false
                }
            };
            if !followed_white {
                debug!(color = %name, "On-tone does not follow white; node left untouched");
                let result = self.republish(&name, ColorRole::OnTone);
                self.guarded(&format!("{name}.on-tone"), result)?;
                continue;
            }

            let result = match self.color_slot(&core_path(&name, ColorRole::Tone)) {
                Ok(tone) => self.revalidate(&name, ColorRole::OnTone, tone.rgb, 1.0),
                Err(err) => Err(err),
            };
            self.guarded(&format!("{name}.on-tone"), result)?;
        }
        Ok(())
    }

    fn interactive_changed(&mut self, value: &str) -> Result<(), CascadeError> {
        let path = interactive_path();
        self.write_theme(&path, value)?;
        let slot = self.color_slot(&path).map_err(|err| {
            debug!(error = %err, "New interactive color does not resolve");
            CascadeError::invalid_trigger("interactive", value)
        })?;
        self.write_css(names::interactive(&self.config.css.prefix), slot.rgb.to_hex());
        Ok(())
    }

    fn emphasis_changed(&mut self, emphasis: Emphasis, value: &str) -> Result<(), CascadeError> {
        let path = emphasis_path(emphasis);
        self.write_theme(&path, value)?;

        let raw = self.working.raw_value(self.mode, &path).unwrap_or_default();
        let alpha = resolve_opacity(&raw, &self.working_ctx())
            .ok_or_else(|| CascadeError::invalid_trigger(path.join("."), value))?;
        self.write_css(
            names::emphasis_opacity(&self.config.css.prefix, emphasis),
            alpha.to_string(),
        );

        for name in self.core_color_names() {
            let result = match self.color_slot(&core_path(&name, ColorRole::Tone)) {
                Ok(tone) => self.revalidate(&name, ColorRole::OnTone, tone.rgb, alpha),
                Err(err) => Err(err),
            };
            self.guarded(&format!("{name}.on-tone"), result)?;
        }
        Ok(())
    }

    fn recompute_layers(&mut self) -> Result<(), CascadeError> {
        let interactive = match self.color_slot(&interactive_path()) {
            Ok(slot) => slot,
            Err(err) if err.is_fatal() => return Err(err),
            Err(err) => {
                debug!(error = %err, "No global interactive color; layers left as they are");
                return Ok(());
            }
        };
        let start = self.search_start(&interactive);

        for layer in 0..self.config.layer_count {
            let result = self.recompute_layer(layer, &interactive, start);
            self.guarded(&format!("layer-{layer}"), result)?;
        }
        Ok(())
    }

    fn recompute_layer(
        &mut self,
        layer: u8,
        interactive: &ColorSlot,
        start: Option<SearchStart<'a>>,
    ) -> Result<(), CascadeError> {
        let surface_path = layer_path(layer, "surface");
        if self.working.node(self.mode, &surface_path).is_none() {
            debug!(layer, "Layer has no surface; skipped");
            return Ok(());
        }

        let threshold = self.config.min_contrast;
        let surface = self.color_slot(&surface_path)?;
        let surface_hex = surface.rgb.to_hex();

        let outcome = match start {
            Some(start) => {
                let darker = step_in_family(start.family, start.level, &surface_hex, Direction::Darker, threshold);
                if darker.compliant {
                    darker
                } else {
                    let lighter =
                        step_in_family(start.family, start.level, &surface_hex, Direction::Lighter, threshold);
                    if lighter.compliant || lighter.ratio > darker.ratio {
                        lighter
                    } else {
                        darker
                    }
                }
            }
            None => {
                let ratio = contrast_ratio_rgb(interactive.rgb, surface.rgb);
                StepOutcome {
                    hex: interactive.rgb.to_hex(),
                    token: None,
                    ratio,
                    compliant: meets(ratio, threshold),
                }
            }
        };
        let chosen = parse_hex_or_black(&outcome.hex);

        let target = layer_path(layer, "element-interactive");
        let current = self.color_slot(&target).ok().map(|slot| slot.rgb);
        if current != Some(chosen) {
            let replacement = outcome
                .token
                .as_ref()
                .map_or_else(|| chosen.to_hex(), TokenPath::to_reference);
            self.write_theme(&target, &replacement)?;
        }
        self.write_css(
            names::layer_element_interactive(&self.config.css.prefix, layer),
            chosen.to_hex(),
        );

        if !outcome.compliant {
            self.warn_non_compliant(WarningSubject::Layer { index: layer }, &chosen.to_hex(), surface.rgb, outcome.ratio);
        }
        Ok(())
    }

    fn finish(self) -> CascadeOutcome {
        CascadeOutcome {
            updated_theme: self.working,
            written_css_vars: self.css_writes,
            theme_writes: self.theme_writes,
            warnings: self.warnings,
        }
    }
}

/// Plan a cascade with the default engine configuration.
pub fn run_compliance_cascade(
    request: &CascadeRequest,
    index: &TokenIndex,
    theme: &ThemeDocument,
) -> Result<CascadeOutcome, CascadeError> {
    run_compliance_cascade_with(request, index, theme, &EngineConfig::default())
}

/// Plan a cascade on a deep copy of `theme`.
///
/// Nothing is written anywhere; the outcome carries the updated snapshot, the
/// CSS variables to write and the theme nodes that changed. Fatal errors
/// discard the working copy.
pub fn run_compliance_cascade_with(
    request: &CascadeRequest,
    index: &TokenIndex,
    theme: &ThemeDocument,
    config: &EngineConfig,
) -> Result<CascadeOutcome, CascadeError> {
    let _timer = OperationTimer::new("compliance_cascade");

    if theme.mode_root(request.mode).is_none() {
        return Err(CascadeError::MissingMode {
            mode: request.mode.to_string(),
        });
    }

    info!(mode = %request.mode, trigger = %request.trigger, "Compliance cascade started");

    let mut cascade = Cascade::new(request.mode, index, theme, config);
    match &request.trigger {
        CascadeTrigger::ToneChanged { color, tone } => cascade.tone_changed(color, tone)?,
        CascadeTrigger::InteractiveChanged { value } => cascade.interactive_changed(value)?,
        CascadeTrigger::EmphasisChanged { emphasis, value } => cascade.emphasis_changed(*emphasis, value)?,
    }
    cascade.recompute_layers()?;

    let outcome = cascade.finish();
    info!(
        mode = %request.mode,
        trigger = %request.trigger,
        theme_writes = outcome.theme_writes.len(),
        css_writes = outcome.written_css_vars.len(),
        warnings = outcome.warnings.len(),
        "Compliance cascade finished"
    );
    Ok(outcome)
}

/// Runs cascades and commits their CSS writes through a batched writer
#[derive(Debug, Clone, Default)]
pub struct ComplianceUpdater {
    config: EngineConfig,
}

impl ComplianceUpdater {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn plan(
        &self,
        request: &CascadeRequest,
        index: &TokenIndex,
        theme: &ThemeDocument,
    ) -> Result<CascadeOutcome, CascadeError> {
        run_compliance_cascade_with(request, index, theme, &self.config)
    }

    /// Plan and commit a cascade.
    ///
    /// The batch opens before planning and closes after every CSS write is
    /// queued, so collaborators get one `VariablesChanged` notification.
    /// `ThemeCommitted` and any compliance warnings follow the flush. The
    /// caller installs `outcome.updated_theme` as the new snapshot.
    pub fn apply<S, B>(
        &self,
        writer: &BatchedWriter<S, B>,
        request: &CascadeRequest,
        index: &TokenIndex,
        theme: &ThemeDocument,
    ) -> Result<CascadeOutcome, CascadeError>
    where
        S: CssVariableStore,
        B: EventBus,
    {
        let batch = writer.begin_batch();
        let outcome = self.plan(request, index, theme)?;
        for (name, value) in &outcome.written_css_vars {
            writer.write(name, value);
        }
        drop(batch);

        writer.bus().dispatch(Event::ThemeCommitted {
            mode: request.mode,
            trigger: request.trigger.to_string(),
            theme_writes: outcome.theme_writes.len(),
        });
        for warning in &outcome.warnings {
            writer.bus().dispatch(warning.to_event());
        }
        Ok(outcome)
    }
}
