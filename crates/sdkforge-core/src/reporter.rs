//! Reporter trait for dependency injection.
//!
//! The engine reports step transitions and download progress without being
//! coupled to a UI. External collaborators consume the serializable
//! [`Event`] form; in-process callers implement [`Reporter`] directly.

use sdkforge_schema::ComponentId;
use serde::{Deserialize, Serialize};

/// Fixed step vocabulary for progress events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Step {
    /// Resolving prerequisites / verifying preconditions.
    Checking,
    /// Artifact transfer in flight; the only step that carries a 0-100 value.
    Downloading,
    /// Archive extraction.
    Extracting,
    /// Install procedure executing.
    Installing,
    /// Uninstall procedure executing.
    Uninstalling,
    /// Terminal success.
    Done,
    /// Terminal failure.
    Error,
}

/// Discriminant of an outgoing event message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventCommand {
    /// Generic step/progress update for a prerequisite tool.
    PrgUpdate,
    /// Step/progress update for the component itself.
    PrgUpdateComp,
    /// Prerequisite resolution finished; payload message lists the result.
    CheckPrerequisitesComplete,
    /// Component install reached `Done`.
    InstallCompComplete,
    /// Component uninstall reached `Done`.
    UninstallCompComplete,
    /// Terminal failure surfaced to the user.
    ErrorPackageManager,
}

/// One message on the progress/event channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    /// Message discriminant.
    pub command: EventCommand,
    /// The component this event concerns.
    pub comp_uid: ComponentId,
    /// Current step, if the command carries one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub step: Option<Step>,
    /// Human-readable message. Empty by convention for user-initiated
    /// cancellation.
    pub message: String,
    /// 0-100 progress value, present only while `DOWNLOADING`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub val: Option<u8>,
}

/// Progress sink implemented by the embedding UI.
pub trait Reporter: Send + Sync {
    /// A step transition for a prerequisite tool install.
    fn tool_step(&self, comp_uid: &ComponentId, step: Step, message: &str);

    /// A step transition for the component's own install/uninstall.
    fn component_step(&self, comp_uid: &ComponentId, step: Step, message: &str);

    /// Download progress, 0-100. Throttled by the download manager.
    fn progress(&self, comp_uid: &ComponentId, val: u8);

    /// Prerequisite resolution for an enqueue request finished.
    fn prereq_check_complete(&self, comp_uid: &ComponentId, message: &str);

    /// The component reached terminal success.
    fn install_complete(&self, comp_uid: &ComponentId);

    /// The component was uninstalled.
    fn uninstall_complete(&self, comp_uid: &ComponentId);

    /// Terminal failure. `message` is empty for user cancellation.
    fn error(&self, comp_uid: &ComponentId, message: &str);
}

impl<T: Reporter + ?Sized> Reporter for std::sync::Arc<T> {
    fn tool_step(&self, comp_uid: &ComponentId, step: Step, message: &str) {
        (**self).tool_step(comp_uid, step, message);
    }
    fn component_step(&self, comp_uid: &ComponentId, step: Step, message: &str) {
        (**self).component_step(comp_uid, step, message);
    }
    fn progress(&self, comp_uid: &ComponentId, val: u8) {
        (**self).progress(comp_uid, val);
    }
    fn prereq_check_complete(&self, comp_uid: &ComponentId, message: &str) {
        (**self).prereq_check_complete(comp_uid, message);
    }
    fn install_complete(&self, comp_uid: &ComponentId) {
        (**self).install_complete(comp_uid);
    }
    fn uninstall_complete(&self, comp_uid: &ComponentId) {
        (**self).uninstall_complete(comp_uid);
    }
    fn error(&self, comp_uid: &ComponentId, message: &str) {
        (**self).error(comp_uid, message);
    }
}

/// A no-op reporter for silent operations and tests.
#[derive(Debug, Clone, Copy)]
pub struct NullReporter;

impl Reporter for NullReporter {
    fn tool_step(&self, _: &ComponentId, _: Step, _: &str) {}
    fn component_step(&self, _: &ComponentId, _: Step, _: &str) {}
    fn progress(&self, _: &ComponentId, _: u8) {}
    fn prereq_check_complete(&self, _: &ComponentId, _: &str) {}
    fn install_complete(&self, _: &ComponentId) {}
    fn uninstall_complete(&self, _: &ComponentId) {}
    fn error(&self, _: &ComponentId, _: &str) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_serializes_with_screaming_tags() {
        let ev = Event {
            command: EventCommand::PrgUpdateComp,
            comp_uid: ComponentId::new("tv-cli"),
            step: Some(Step::Downloading),
            message: "Downloading TV CLI".into(),
            val: Some(42),
        };
        let json = serde_json::to_string(&ev).unwrap();
        assert!(json.contains("\"PRG_UPDATE_COMP\""));
        assert!(json.contains("\"DOWNLOADING\""));
        assert!(json.contains("\"val\":42"));
    }

    #[test]
    fn optional_fields_are_omitted() {
        let ev = Event {
            command: EventCommand::InstallCompComplete,
            comp_uid: ComponentId::new("tv-cli"),
            step: None,
            message: String::new(),
            val: None,
        };
        let json = serde_json::to_string(&ev).unwrap();
        assert!(!json.contains("step"));
        assert!(!json.contains("val"));
    }
}
