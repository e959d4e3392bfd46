//! Reporter implementations for the terminal.
//!
//! Two flavors: styled line output for humans, and one JSON event per
//! line for external consumers driving the install from another process.

use crossterm::style::Stylize;
use sdkforge_core::{Event, EventCommand, Reporter, Step};
use sdkforge_schema::ComponentId;
use std::io::Write;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

/// Pick the reporter matching the `--json` flag.
pub fn reporter_for(json: bool) -> Arc<dyn Reporter> {
    if json {
        Arc::new(JsonReporter)
    } else {
        Arc::new(ConsoleReporter::default())
    }
}

/// Styled human-readable progress lines.
#[derive(Debug, Default)]
pub struct ConsoleReporter {
    last_pct: AtomicU8,
}

impl ConsoleReporter {
    fn line(&self, step: Step, message: &str) {
        let tag = match step {
            Step::Checking => "check".dark_grey(),
            Step::Downloading => "fetch".cyan(),
            Step::Extracting => "unpack".cyan(),
            Step::Installing | Step::Uninstalling => "run".yellow(),
            Step::Done => "done".green(),
            Step::Error => "error".red(),
        };
        println!("{tag:>8}  {message}");
    }
}

impl Reporter for ConsoleReporter {
    fn tool_step(&self, _comp_uid: &ComponentId, step: Step, message: &str) {
        self.line(step, message);
    }

    fn component_step(&self, _comp_uid: &ComponentId, step: Step, message: &str) {
        self.line(step, message);
    }

    fn progress(&self, _comp_uid: &ComponentId, val: u8) {
        // The engine throttles; only repaint on a changed percentage.
        if self.last_pct.swap(val, Ordering::Relaxed) == val {
            return;
        }
        print!("\r{:>8}  {val:>3}%", "fetch".cyan());
        if val == 100 {
            println!();
        }
        let _ = std::io::stdout().flush();
    }

    fn prereq_check_complete(&self, _comp_uid: &ComponentId, message: &str) {
        self.line(Step::Checking, message);
    }

    fn install_complete(&self, comp_uid: &ComponentId) {
        self.line(Step::Done, &format!("{comp_uid} installed"));
    }

    fn uninstall_complete(&self, comp_uid: &ComponentId) {
        self.line(Step::Done, &format!("{comp_uid} removed"));
    }

    fn error(&self, comp_uid: &ComponentId, message: &str) {
        // Empty message means user cancellation; keep the console quiet.
        if message.is_empty() {
            self.line(Step::Done, &format!("{comp_uid} cancelled"));
        } else {
            self.line(Step::Error, message);
        }
    }
}

/// One serialized [`Event`] per line on stdout.
#[derive(Debug, Clone, Copy)]
pub struct JsonReporter;

impl JsonReporter {
    fn emit(event: &Event) {
        if let Ok(line) = serde_json::to_string(event) {
            println!("{line}");
        }
    }
}

impl Reporter for JsonReporter {
    fn tool_step(&self, comp_uid: &ComponentId, step: Step, message: &str) {
        Self::emit(&Event {
            command: EventCommand::PrgUpdate,
            comp_uid: comp_uid.clone(),
            step: Some(step),
            message: message.to_string(),
            val: None,
        });
    }

    fn component_step(&self, comp_uid: &ComponentId, step: Step, message: &str) {
        Self::emit(&Event {
            command: EventCommand::PrgUpdateComp,
            comp_uid: comp_uid.clone(),
            step: Some(step),
            message: message.to_string(),
            val: None,
        });
    }

    fn progress(&self, comp_uid: &ComponentId, val: u8) {
        Self::emit(&Event {
            command: EventCommand::PrgUpdateComp,
            comp_uid: comp_uid.clone(),
            step: Some(Step::Downloading),
            message: String::new(),
            val: Some(val),
        });
    }

    fn prereq_check_complete(&self, comp_uid: &ComponentId, message: &str) {
        Self::emit(&Event {
            command: EventCommand::CheckPrerequisitesComplete,
            comp_uid: comp_uid.clone(),
            step: None,
            message: message.to_string(),
            val: None,
        });
    }

    fn install_complete(&self, comp_uid: &ComponentId) {
        Self::emit(&Event {
            command: EventCommand::InstallCompComplete,
            comp_uid: comp_uid.clone(),
            step: Some(Step::Done),
            message: String::new(),
            val: None,
        });
    }

    fn uninstall_complete(&self, comp_uid: &ComponentId) {
        Self::emit(&Event {
            command: EventCommand::UninstallCompComplete,
            comp_uid: comp_uid.clone(),
            step: Some(Step::Done),
            message: String::new(),
            val: None,
        });
    }

    fn error(&self, comp_uid: &ComponentId, message: &str) {
        Self::emit(&Event {
            command: EventCommand::ErrorPackageManager,
            comp_uid: comp_uid.clone(),
            step: Some(Step::Error),
            message: message.to_string(),
            val: None,
        });
    }
}
