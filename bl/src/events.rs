//! Build event vocabulary
//!
//! These are the notifications a build host raises while it runs:
//! - Nesting lifecycle (build, project, target, task start and finish)
//! - Diagnostics (errors and warnings with a source location)
//! - Messages, tagged with an importance the logger filters on
//!
//! Events serialize with a `type` tag so a recorded build can be replayed
//! from a JSON-lines file.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A single notification raised by the build host
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum BuildEvent {
    // === Nesting Lifecycle ===
    BuildStarted {
        sender_name: String,
        message: String,
    },
    BuildFinished {
        sender_name: String,
        message: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        succeeded: Option<bool>,
    },
    ProjectStarted {
        sender_name: String,
        message: String,
    },
    ProjectFinished {
        sender_name: String,
        message: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        succeeded: Option<bool>,
    },
    TargetStarted {
        sender_name: String,
        message: String,
    },
    TargetFinished {
        sender_name: String,
        message: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        succeeded: Option<bool>,
    },
    TaskStarted {
        sender_name: String,
        message: String,
    },
    TaskFinished {
        sender_name: String,
        message: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        succeeded: Option<bool>,
    },

    // === Diagnostics ===
    ErrorRaised {
        sender_name: String,
        message: String,
        #[serde(default)]
        file: String,
        #[serde(default)]
        line: u32,
        #[serde(default)]
        column: u32,
    },
    WarningRaised {
        sender_name: String,
        message: String,
        #[serde(default)]
        file: String,
        #[serde(default)]
        line: u32,
        #[serde(default)]
        column: u32,
    },

    // === Messages ===
    MessageRaised {
        sender_name: String,
        message: String,
        #[serde(default)]
        importance: MessageImportance,
    },
}

impl BuildEvent {
    /// The kind this event is delivered under
    pub fn kind(&self) -> EventKind {
        match self {
            BuildEvent::BuildStarted { .. } => EventKind::BuildStarted,
            BuildEvent::BuildFinished { .. } => EventKind::BuildFinished,
            BuildEvent::ProjectStarted { .. } => EventKind::ProjectStarted,
            BuildEvent::ProjectFinished { .. } => EventKind::ProjectFinished,
            BuildEvent::TargetStarted { .. } => EventKind::TargetStarted,
            BuildEvent::TargetFinished { .. } => EventKind::TargetFinished,
            BuildEvent::TaskStarted { .. } => EventKind::TaskStarted,
            BuildEvent::TaskFinished { .. } => EventKind::TaskFinished,
            BuildEvent::ErrorRaised { .. } => EventKind::ErrorRaised,
            BuildEvent::WarningRaised { .. } => EventKind::WarningRaised,
            BuildEvent::MessageRaised { .. } => EventKind::MessageRaised,
        }
    }

    /// Name of the component that raised the event
    pub fn sender_name(&self) -> &str {
        match self {
            BuildEvent::BuildStarted { sender_name, .. }
            | BuildEvent::BuildFinished { sender_name, .. }
            | BuildEvent::ProjectStarted { sender_name, .. }
            | BuildEvent::ProjectFinished { sender_name, .. }
            | BuildEvent::TargetStarted { sender_name, .. }
            | BuildEvent::TargetFinished { sender_name, .. }
            | BuildEvent::TaskStarted { sender_name, .. }
            | BuildEvent::TaskFinished { sender_name, .. }
            | BuildEvent::ErrorRaised { sender_name, .. }
            | BuildEvent::WarningRaised { sender_name, .. }
            | BuildEvent::MessageRaised { sender_name, .. } => sender_name,
        }
    }

    /// The event's own message text
    pub fn message(&self) -> &str {
        match self {
            BuildEvent::BuildStarted { message, .. }
            | BuildEvent::BuildFinished { message, .. }
            | BuildEvent::ProjectStarted { message, .. }
            | BuildEvent::ProjectFinished { message, .. }
            | BuildEvent::TargetStarted { message, .. }
            | BuildEvent::TargetFinished { message, .. }
            | BuildEvent::TaskStarted { message, .. }
            | BuildEvent::TaskFinished { message, .. }
            | BuildEvent::ErrorRaised { message, .. }
            | BuildEvent::WarningRaised { message, .. }
            | BuildEvent::MessageRaised { message, .. } => message,
        }
    }

    // === Convenience constructors ===

    pub fn build_started(sender_name: &str, message: &str) -> Self {
        BuildEvent::BuildStarted {
            sender_name: sender_name.to_string(),
            message: message.to_string(),
        }
    }

    pub fn build_finished(sender_name: &str, message: &str) -> Self {
        BuildEvent::BuildFinished {
            sender_name: sender_name.to_string(),
            message: message.to_string(),
            succeeded: None,
        }
    }

    pub fn project_started(sender_name: &str, message: &str) -> Self {
        BuildEvent::ProjectStarted {
            sender_name: sender_name.to_string(),
            message: message.to_string(),
        }
    }

    pub fn project_finished(sender_name: &str, message: &str) -> Self {
        BuildEvent::ProjectFinished {
            sender_name: sender_name.to_string(),
            message: message.to_string(),
            succeeded: None,
        }
    }

    pub fn target_started(sender_name: &str, message: &str) -> Self {
        BuildEvent::TargetStarted {
            sender_name: sender_name.to_string(),
            message: message.to_string(),
        }
    }

    pub fn target_finished(sender_name: &str, message: &str) -> Self {
        BuildEvent::TargetFinished {
            sender_name: sender_name.to_string(),
            message: message.to_string(),
            succeeded: None,
        }
    }

    pub fn task_started(sender_name: &str, message: &str) -> Self {
        BuildEvent::TaskStarted {
            sender_name: sender_name.to_string(),
            message: message.to_string(),
        }
    }

    pub fn task_finished(sender_name: &str, message: &str) -> Self {
        BuildEvent::TaskFinished {
            sender_name: sender_name.to_string(),
            message: message.to_string(),
            succeeded: None,
        }
    }

    pub fn error(sender_name: &str, file: &str, line: u32, column: u32, message: &str) -> Self {
        BuildEvent::ErrorRaised {
            sender_name: sender_name.to_string(),
            message: message.to_string(),
            file: file.to_string(),
            line,
            column,
        }
    }

    pub fn warning(sender_name: &str, file: &str, line: u32, column: u32, message: &str) -> Self {
        BuildEvent::WarningRaised {
            sender_name: sender_name.to_string(),
            message: message.to_string(),
            file: file.to_string(),
            line,
            column,
        }
    }

    pub fn message_raised(sender_name: &str, importance: MessageImportance, message: &str) -> Self {
        BuildEvent::MessageRaised {
            sender_name: sender_name.to_string(),
            message: message.to_string(),
            importance,
        }
    }
}

/// Event kinds a logger can subscribe to
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    BuildStarted,
    BuildFinished,
    ProjectStarted,
    ProjectFinished,
    TargetStarted,
    TargetFinished,
    TaskStarted,
    TaskFinished,
    ErrorRaised,
    WarningRaised,
    MessageRaised,
}

impl EventKind {
    /// Every kind, nesting kinds first
    pub const ALL: [EventKind; 11] = [
        EventKind::BuildStarted,
        EventKind::BuildFinished,
        EventKind::ProjectStarted,
        EventKind::ProjectFinished,
        EventKind::TargetStarted,
        EventKind::TargetFinished,
        EventKind::TaskStarted,
        EventKind::TaskFinished,
        EventKind::ErrorRaised,
        EventKind::WarningRaised,
        EventKind::MessageRaised,
    ];

    /// Category label written at the head of each transcript line
    pub fn category(&self) -> &'static str {
        match self {
            EventKind::BuildStarted => "BuildStarted",
            EventKind::BuildFinished => "BuildFinished",
            EventKind::ProjectStarted => "ProjectStarted",
            EventKind::ProjectFinished => "ProjectFinished",
            EventKind::TargetStarted => "TargetStarted",
            EventKind::TargetFinished => "TargetFinished",
            EventKind::TaskStarted => "TaskStarted",
            EventKind::TaskFinished => "TaskFinished",
            EventKind::ErrorRaised => "ErrorRaised",
            EventKind::WarningRaised => "WarningRaised",
            EventKind::MessageRaised => "MessageRaised",
        }
    }

    /// Opens a nesting scope
    pub fn is_started(&self) -> bool {
        matches!(
            self,
            EventKind::BuildStarted | EventKind::ProjectStarted | EventKind::TargetStarted | EventKind::TaskStarted
        )
    }

    /// Closes a nesting scope
    pub fn is_finished(&self) -> bool {
        matches!(
            self,
            EventKind::BuildFinished | EventKind::ProjectFinished | EventKind::TargetFinished | EventKind::TaskFinished
        )
    }

    /// Whether the kind moves the indent depth
    pub fn is_nesting(&self) -> bool {
        self.is_started() || self.is_finished()
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.category())
    }
}

/// How important the host considers a message
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageImportance {
    High,
    #[default]
    Normal,
    Low,
}

impl MessageImportance {
    /// Lowest verbosity at which a message of this importance is recorded
    pub fn required_verbosity(&self) -> Verbosity {
        match self {
            MessageImportance::High => Verbosity::Minimal,
            MessageImportance::Normal => Verbosity::Normal,
            MessageImportance::Low => Verbosity::Detailed,
        }
    }
}

/// Ambient logger verbosity, ordered from quietest to loudest
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum Verbosity {
    Quiet,
    Minimal,
    #[default]
    Normal,
    Detailed,
    Diagnostic,
}

impl Verbosity {
    pub fn is_at_least(&self, level: Verbosity) -> bool {
        *self >= level
    }

    /// Whether a message of the given importance passes the gate
    pub fn admits(&self, importance: MessageImportance) -> bool {
        self.is_at_least(importance.required_verbosity())
    }
}

impl FromStr for Verbosity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "q" | "quiet" => Ok(Verbosity::Quiet),
            "m" | "minimal" => Ok(Verbosity::Minimal),
            "n" | "normal" => Ok(Verbosity::Normal),
            "d" | "detailed" => Ok(Verbosity::Detailed),
            "diag" | "diagnostic" => Ok(Verbosity::Diagnostic),
            other => Err(format!("Unknown verbosity: {}", other)),
        }
    }
}

impl TryFrom<String> for Verbosity {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for Verbosity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Verbosity::Quiet => "quiet",
            Verbosity::Minimal => "minimal",
            Verbosity::Normal => "normal",
            Verbosity::Detailed => "detailed",
            Verbosity::Diagnostic => "diagnostic",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_and_accessors() {
        let event = BuildEvent::error("csc", "a.cs", 10, 5, "CS0001");
        assert_eq!(event.kind(), EventKind::ErrorRaised);
        assert_eq!(event.sender_name(), "csc");
        assert_eq!(event.message(), "CS0001");
    }

    #[test]
    fn test_nesting_kinds() {
        let nesting: Vec<_> = EventKind::ALL.iter().filter(|k| k.is_nesting()).collect();
        assert_eq!(nesting.len(), 8);

        assert!(EventKind::TaskStarted.is_started());
        assert!(!EventKind::TaskStarted.is_finished());
        assert!(EventKind::TargetFinished.is_finished());
        assert!(!EventKind::ErrorRaised.is_nesting());
        assert!(!EventKind::WarningRaised.is_nesting());
        assert!(!EventKind::MessageRaised.is_nesting());
    }

    #[test]
    fn test_category_matches_variant_name() {
        assert_eq!(EventKind::BuildStarted.category(), "BuildStarted");
        assert_eq!(EventKind::MessageRaised.to_string(), "MessageRaised");
    }

    #[test]
    fn test_verbosity_gate() {
        assert!(Verbosity::Minimal.admits(MessageImportance::High));
        assert!(!Verbosity::Quiet.admits(MessageImportance::High));

        assert!(Verbosity::Normal.admits(MessageImportance::Normal));
        assert!(!Verbosity::Minimal.admits(MessageImportance::Normal));

        assert!(Verbosity::Detailed.admits(MessageImportance::Low));
        assert!(Verbosity::Diagnostic.admits(MessageImportance::Low));
        assert!(!Verbosity::Normal.admits(MessageImportance::Low));
    }

    #[test]
    fn test_verbosity_from_str() {
        assert_eq!("diag".parse::<Verbosity>().unwrap(), Verbosity::Diagnostic);
        assert_eq!("Detailed".parse::<Verbosity>().unwrap(), Verbosity::Detailed);
        assert_eq!(" q ".parse::<Verbosity>().unwrap(), Verbosity::Quiet);
        assert!("loud".parse::<Verbosity>().is_err());
    }

    #[test]
    fn test_verbosity_deserializes_like_from_str() {
        let verbosity: Verbosity = serde_json::from_str(r#""Detailed""#).unwrap();
        assert_eq!(verbosity, Verbosity::Detailed);

        let verbosity: Verbosity = serde_json::from_str(r#""m""#).unwrap();
        assert_eq!(verbosity, Verbosity::Minimal);

        assert!(serde_json::from_str::<Verbosity>(r#""loud""#).is_err());
        assert_eq!(serde_json::to_string(&Verbosity::Diagnostic).unwrap(), r#""diagnostic""#);
    }

    #[test]
    fn test_event_json_shape() {
        let json = r#"{"type":"MessageRaised","sender_name":"MSBuild","message":"hi","importance":"low"}"#;
        let event: BuildEvent = serde_json::from_str(json).unwrap();
        assert_eq!(event, BuildEvent::message_raised("MSBuild", MessageImportance::Low, "hi"));

        let json = r#"{"type":"ErrorRaised","sender_name":"csc","message":"boom"}"#;
        let event: BuildEvent = serde_json::from_str(json).unwrap();
        assert_eq!(event, BuildEvent::error("csc", "", 0, 0, "boom"));
    }

    #[test]
    fn test_finished_outcome_is_optional() {
        let json = r#"{"type":"BuildFinished","sender_name":"MSBuild","message":"Build succeeded.","succeeded":true}"#;
        let event: BuildEvent = serde_json::from_str(json).unwrap();
        match event {
            BuildEvent::BuildFinished { succeeded, .. } => assert_eq!(succeeded, Some(true)),
            _ => panic!("Expected BuildFinished event"),
        }

        let serialized = serde_json::to_string(&BuildEvent::build_finished("MSBuild", "done")).unwrap();
        assert!(!serialized.contains("succeeded"));
    }
}
