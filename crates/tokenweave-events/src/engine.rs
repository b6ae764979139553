// ABOUTME: Engine domain events raised by compliance cascades and CSS batches
// ABOUTME: Immutable facts about what has happened, consumed by the UI layer

use serde::Serialize;
use tokenweave_types::{ColorRole, Mode};

/// Engine domain events
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// One coalesced notification per completed CSS-variable batch
    VariablesChanged { names: Vec<String> },

    /// A cascade replaced the theme snapshot
    ThemeCommitted {
        mode: Mode,
        trigger: String,
        theme_writes: usize,
    },

    /// A value was committed although no candidate met the threshold
    ComplianceWarning {
        subject: WarningSubject,
        foreground: String,
        background: String,
        ratio: f64,
        threshold: f64,
    },
}

/// What a compliance warning is about
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WarningSubject {
    CoreColor { name: String, role: ColorRole },
    Layer { index: u8 },
}

impl Event {
    pub fn name(&self) -> &'static str {
        match self {
            Event::VariablesChanged { .. } => "variables_changed",
            Event::ThemeCommitted { .. } => "theme_committed",
            Event::ComplianceWarning { .. } => "compliance_warning",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_serializes_with_type_tag() {
        let event = Event::ComplianceWarning {
            subject: WarningSubject::CoreColor {
                name: "white".into(),
                role: ColorRole::OnTone,
            },
            foreground: "#ffffff".into(),
            background: "#f5f5f0".into(),
            ratio: 1.1,
            threshold: 4.5,
        };

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "compliance_warning");
        assert_eq!(json["subject"]["kind"], "core_color");
        assert_eq!(json["subject"]["role"], "on-tone");
        assert_eq!(event.name(), "compliance_warning");
    }
}
