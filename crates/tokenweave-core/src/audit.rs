// ABOUTME: Read-only compliance audit over one mode of a theme document
// ABOUTME: Reports every tone/on-tone, tone/interactive and surface/element pair with its ratio

use crate::color_math::{ContrastRatios, Rgb, contrast_ratio_rgb, meets};
use crate::compliance::{CORE_COLORS, PALETTES, core_path, layer_path};
use crate::config::EngineConfig;
use crate::document::ThemeDocument;
use crate::error::CascadeError;
use crate::resolver::{ResolveContext, resolve};
use crate::token_index::TokenIndex;
use serde::Serialize;
use std::time::{Duration, Instant};
use tokenweave_logging::debug;
use tokenweave_types::{ColorRole, Mode};

/// How badly a pair misses the threshold
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditSeverity {
    /// Meets the threshold
    Pass,
    /// Below the threshold but readable as large text
    Warning,
    /// Below the large-text ratio
    Error,
    /// One side of the pair does not resolve to a color
    Unresolved,
}

/// Relationship a pair belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PairKind {
    OnTone,
    Interactive,
    ElementInteractive,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuditEntry {
    /// Dotted subject, e.g. `white.on-tone` or `layer-0.element-interactive`
    pub subject: String,
    pub kind: PairKind,
    pub foreground: Option<String>,
    pub background: Option<String>,
    pub ratio: Option<f64>,
    pub severity: AuditSeverity,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuditReport {
    pub mode: Mode,
    pub threshold: f64,
    pub entries: Vec<AuditEntry>,
    #[serde(skip)]
    pub duration: Duration,
}

impl AuditReport {
    pub fn is_compliant(&self) -> bool {
        self.entries
            .iter()
            .all(|entry| entry.severity == AuditSeverity::Pass)
    }

    pub fn by_severity(&self, severity: AuditSeverity) -> Vec<&AuditEntry> {
        self.entries
            .iter()
            .filter(|entry| entry.severity == severity)
            .collect()
    }

    /// Entries that do not pass, worst first
    pub fn failures(&self) -> Vec<&AuditEntry> {
        let mut failures: Vec<&AuditEntry> = self
            .entries
            .iter()
            .filter(|entry| entry.severity != AuditSeverity::Pass)
            .collect();
        failures.sort_by(|a, b| b.severity.cmp(&a.severity));
        failures
    }

    pub fn summary(&self) -> String {
        format!(
            "Audit {}: {} | {} pairs ({} errors, {} warnings, {} unresolved) at {:.1}:1 in {:.2}ms",
            self.mode,
            if self.is_compliant() { "PASS" } else { "FAIL" },
            self.entries.len(),
            self.by_severity(AuditSeverity::Error).len(),
            self.by_severity(AuditSeverity::Warning).len(),
            self.by_severity(AuditSeverity::Unresolved).len(),
            self.threshold,
            self.duration.as_secs_f64() * 1000.0
        )
    }
}

fn severity_for(ratio: f64, threshold: f64) -> AuditSeverity {
    if meets(ratio, threshold) {
        AuditSeverity::Pass
    } else if meets(ratio, ContrastRatios::AA_LARGE) {
        AuditSeverity::Warning
    } else {
        AuditSeverity::Error
    }
}

struct Auditor<'a> {
    ctx: ResolveContext<'a>,
    threshold: f64,
    entries: Vec<AuditEntry>,
}

impl Auditor<'_> {
    fn color(&self, path: &[String]) -> Option<Rgb> {
        let raw = self.ctx.theme.raw_value(self.ctx.mode, path)?;
        match resolve(&raw, &self.ctx) {
            Ok(resolution) => resolution.color(),
            Err(err) => {
                debug!(path = %path.join("."), error = %err, "Audit could not resolve slot");
                None
            }
        }
    }

    fn check(&mut self, subject: String, kind: PairKind, foreground: &[String], background: &[String]) {
        let theme = self.ctx.theme;
        if theme.node(self.ctx.mode, foreground).is_none() {
            return;
        }

        let fg = self.color(foreground);
        let bg = self.color(background);
        let (ratio, severity) = match (fg, bg) {
            (Some(fg), Some(bg)) => {
                let ratio = contrast_ratio_rgb(fg, bg);
                (Some(ratio), severity_for(ratio, self.threshold))
            }
            _ => (None, AuditSeverity::Unresolved),
        };

        self.entries.push(AuditEntry {
            subject,
            kind,
            foreground: fg.map(Rgb::to_hex),
            background: bg.map(Rgb::to_hex),
            ratio,
            severity,
        });
    }
}

/// Check every compliance relationship in `mode` without changing anything.
pub fn audit_theme(
    mode: Mode,
    index: &TokenIndex,
    theme: &ThemeDocument,
    config: &EngineConfig,
) -> Result<AuditReport, CascadeError> {
    let started = Instant::now();
    if theme.mode_root(mode).is_none() {
        return Err(CascadeError::MissingMode {
            mode: mode.to_string(),
        });
    }

    let mut auditor = Auditor {
        ctx: ResolveContext::new(mode, index, theme).with_max_depth(config.max_depth),
        threshold: config.min_contrast,
        entries: Vec::new(),
    };

    let colors = theme.child_names(mode, &[PALETTES.to_string(), CORE_COLORS.to_string()]);
    for color in colors.iter().filter(|name| !name.starts_with('$')) {
        let tone = core_path(color, ColorRole::Tone);
        for (role, kind) in [
            (ColorRole::OnTone, PairKind::OnTone),
            (ColorRole::Interactive, PairKind::Interactive),
        ] {
            auditor.check(format!("{color}.{role}"), kind, &core_path(color, role), &tone);
        }
    }

    for layer in 0..config.layer_count {
        auditor.check(
            format!("layer-{layer}.element-interactive"),
            PairKind::ElementInteractive,
            &layer_path(layer, "element-interactive"),
            &layer_path(layer, "surface"),
        );
    }

    let report = AuditReport {
        mode,
        threshold: config.min_contrast,
        entries: auditor.entries,
        duration: started.elapsed(),
    };
    debug!(summary = %report.summary(), "Theme audit complete");
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{sample_index, sample_theme};

    #[test]
    fn test_sample_theme_reports_every_pair() {
        let report = audit_theme(Mode::Light, &sample_index(), &sample_theme(), &EngineConfig::default()).unwrap();

        let subjects: Vec<&str> = report.entries.iter().map(|e| e.subject.as_str()).collect();
        assert!(subjects.contains(&"white.on-tone"));
        assert!(subjects.contains(&"primary.interactive"));
        assert!(subjects.contains(&"layer-0.element-interactive"));
        assert!(report.is_compliant(), "{}", report.summary());
    }

    #[test]
    fn test_failures_are_graded() {
        assert_eq!(severity_for(4.6, 4.5), AuditSeverity::Pass);
        assert_eq!(severity_for(3.5, 4.5), AuditSeverity::Warning);
        assert_eq!(severity_for(1.2, 4.5), AuditSeverity::Error);
    }

    #[test]
    fn test_unresolved_pairs_are_reported() {
        let theme = ThemeDocument::new(serde_json::json!({
            "themes": { "light": {
                "palettes": { "core-colors": { "ghost": {
                    "tone": { "$value": "{tokens.colors.missing.500}" },
                    "on-tone": { "$value": "#000000" }
                } } }
            } }
        }));
        let report = audit_theme(Mode::Light, &sample_index(), &theme, &EngineConfig::default()).unwrap();
        assert_eq!(report.failures().len(), 1);
        assert_eq!(report.failures()[0].severity, AuditSeverity::Unresolved);
        assert!(!report.is_compliant());
    }

    #[test]
    fn test_missing_mode() {
        let err = audit_theme(Mode::Dark, &sample_index(), &sample_theme(), &EngineConfig::default()).unwrap_err();
        assert!(matches!(err, CascadeError::MissingMode { .. }));
    }
}
