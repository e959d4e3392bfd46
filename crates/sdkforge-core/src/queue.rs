//! The install orchestrator: a serialized FIFO queue of install requests.
//!
//! Requests go through two stages. `plan` is a pure check (resolve
//! prerequisites, busy check, disk gate) whose result the caller shows
//! to the user for confirmation. `enqueue` accepts a confirmed plan,
//! creates the component directory, marks the plan's tools busy, and
//! appends a [`QueueItem`]. `process_queue` then drains items one at a
//! time: all of an item's prerequisite installs run to completion before
//! its component install starts, and no two items' bodies ever overlap.

use crate::error::InstallError;
use crate::installers::{self, InstallContext};
use crate::io::download::{artifact_name, CancelHandle};
use crate::paths::Paths;
use crate::process::{self, shortcut::Shortcuts};
use crate::reporter::{Reporter, Step};
use crate::resolver::{self, Requirement};
use crate::store::{CatalogStore, StatusStore};
use reqwest::Client;
use sdkforge_schema::{
    Component, ComponentId, ComponentType, Os, PrereqFile, SdkFamily, ToolInstallMethod, ToolKey,
};
use std::collections::{HashSet, VecDeque};
use std::sync::Arc;
use tracing::{info, warn};

/// Fixed headroom added on top of the declared footprints before the
/// free-space comparison.
pub const SAFETY_MARGIN_MB: u64 = 512;

/// Lifecycle of one queue item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemState {
    /// Accepted, waiting its turn.
    Queued,
    /// Installing unmet prerequisite tools, in declaration order.
    ProcessingPrereqs,
    /// Running the component's own install procedure.
    ProcessingComponent,
    /// Terminal success.
    Done,
    /// Terminal failure after cleanup.
    Failed,
    /// User-initiated stop after cleanup.
    Cancelled,
}

impl ItemState {
    /// Whether the item has left the active queue.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Failed | Self::Cancelled)
    }
}

/// One in-flight install request.
#[derive(Debug)]
pub struct QueueItem {
    /// Family the component belongs to.
    pub family: SdkFamily,
    /// The target component record.
    pub component: Component,
    /// Unmet tools to install first, in declaration order.
    pub unmet: Vec<(ToolKey, Requirement)>,
    /// Current lifecycle state.
    pub state: ItemState,
    /// File name of the artifact currently downloading, once known.
    pub artifact: Option<String>,
    /// Failure text for `Failed` items; `None` otherwise (cancellations
    /// included).
    pub error: Option<String>,
}

/// A checked install request awaiting user confirmation.
#[derive(Debug)]
pub struct InstallPlan {
    /// Family the component belongs to.
    pub family: SdkFamily,
    /// The target component record.
    pub component: Component,
    /// Unmet tools the install will provision first.
    pub unmet: Vec<(ToolKey, Requirement)>,
    /// Total declared footprint plus safety margin, in MB.
    pub required_mb: u64,
}

/// Outcome of a `plan` call.
#[derive(Debug)]
pub enum Planned {
    /// The component is already recorded as installed; nothing to do.
    AlreadyInstalled,
    /// The request is installable; confirm and pass to `enqueue`.
    Ready(InstallPlan),
}

/// Serialized install queue over the shared stores.
pub struct Orchestrator {
    paths: Paths,
    catalog: CatalogStore,
    prereq: PrereqFile,
    status: StatusStore,
    client: Client,
    reporter: Arc<dyn Reporter>,
    cancel: CancelHandle,
    shortcuts: Option<Shortcuts>,
    queue: VecDeque<QueueItem>,
    busy: HashSet<ToolKey>,
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("queue_len", &self.queue.len())
            .field("busy", &self.busy)
            .finish_non_exhaustive()
    }
}

impl Orchestrator {
    /// Build an orchestrator over already-loaded stores.
    pub fn new(
        paths: Paths,
        catalog: CatalogStore,
        prereq: PrereqFile,
        status: StatusStore,
        reporter: Arc<dyn Reporter>,
    ) -> Self {
        let client = Client::builder()
            .user_agent(crate::USER_AGENT)
            .build()
            .unwrap_or_default();
        Self {
            paths,
            catalog,
            prereq,
            status,
            client,
            reporter,
            cancel: CancelHandle::new(),
            shortcuts: Shortcuts::for_user(),
            queue: VecDeque::new(),
            busy: HashSet::new(),
        }
    }

    /// Override the launcher directory (tests point it at a temp dir).
    pub fn set_shortcuts(&mut self, shortcuts: Shortcuts) {
        self.shortcuts = Some(shortcuts);
    }

    /// The loaded catalog store.
    pub fn catalog(&self) -> &CatalogStore {
        &self.catalog
    }

    /// The loaded status store.
    pub fn status(&self) -> &StatusStore {
        &self.status
    }

    /// Mutable status store access for maintenance operations
    /// (refresh, uninstall bookkeeping).
    pub fn status_mut(&mut self) -> &mut StatusStore {
        &mut self.status
    }

    /// The prerequisite document.
    pub fn prereq(&self) -> &PrereqFile {
        &self.prereq
    }

    /// Handle for cancelling the active download.
    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    /// Check an install request without mutating anything.
    ///
    /// Resolves prerequisites, rejects if an unmet tool is mid-install
    /// elsewhere, and applies the disk-space gate. The returned plan
    /// carries everything the caller needs for a confirmation prompt.
    pub fn plan(
        &self,
        family: &SdkFamily,
        ctype: &ComponentType,
        comp_uid: &ComponentId,
        os: Os,
    ) -> Result<Planned, InstallError> {
        let (found_type, component) = self
            .catalog
            .catalog()
            .find(family, comp_uid)
            .ok_or_else(|| InstallError::NotFound(format!("unknown component '{comp_uid}'")))?;
        if found_type != ctype {
            return Err(InstallError::NotFound(format!(
                "component '{comp_uid}' is not a '{ctype}'"
            )));
        }

        // Same installed version is a no-op; a different one proceeds as
        // an upgrade and replaces the old directory.
        if let Some(rec) = self.status.doc().component(family, comp_uid) {
            if rec.sdk_version == component.version {
                return Ok(Planned::AlreadyInstalled);
            }
            info!(id = %comp_uid, from = %rec.sdk_version, to = %component.version, "upgrade");
        }

        let resolved =
            resolver::resolve(&self.prereq, self.status.doc(), family, ctype, comp_uid, os)?;
        let mut unmet: Vec<(ToolKey, Requirement)> = Vec::new();
        for (tool, req) in resolved {
            if req.satisfied {
                continue;
            }
            if self.busy.contains(&tool) {
                return Err(InstallError::Busy(tool));
            }
            unmet.push((tool, req));
        }

        // Installer packages run elevated; refuse before anything
        // touches the disk when elevation would prompt or fail.
        if requires_elevation(&unmet) && !process::elevation_available() {
            return Err(InstallError::PrivilegeRequired(
                "a prerequisite installs through a system installer package".to_string(),
            ));
        }

        let tool_mb: u64 = unmet
            .iter()
            .filter_map(|(_, r)| r.distribution.as_ref())
            .map(|d| d.expected_size_mb)
            .sum();
        let required_mb = tool_mb + component.expected_size_mb + SAFETY_MARGIN_MB;
        let available_mb = free_space_mb(&self.paths);
        disk_gate(available_mb, required_mb)?;

        let plan = InstallPlan {
            family: family.clone(),
            component: component.clone(),
            unmet,
            required_mb,
        };
        self.reporter.prereq_check_complete(
            comp_uid,
            &format!(
                "{} unmet prerequisite(s), {} MB required",
                plan.unmet.len(),
                plan.required_mb
            ),
        );
        Ok(Planned::Ready(plan))
    }

    /// Accept a confirmed plan: create the component directory, mark the
    /// plan's tools busy, and append the item to the queue.
    pub fn enqueue(&mut self, plan: InstallPlan) -> Result<(), InstallError> {
        let dir = self
            .paths
            .component_dir(&plan.family, &plan.component.subdir);
        std::fs::create_dir_all(&dir)?;

        for (tool, _) in &plan.unmet {
            self.busy.insert(tool.clone());
        }
        info!(id = %plan.component.id, unmet = plan.unmet.len(), "enqueued install");
        self.queue.push_back(QueueItem {
            family: plan.family,
            component: plan.component,
            unmet: plan.unmet,
            state: ItemState::Queued,
            artifact: None,
            error: None,
        });
        Ok(())
    }

    /// Drain the queue FIFO, one item fully to completion before the next.
    ///
    /// Returns the drained items with their terminal states, for callers
    /// that want to report or log the outcome.
    pub async fn process_queue(&mut self) -> Vec<QueueItem> {
        let mut finished = Vec::new();
        while let Some(mut item) = self.queue.pop_front() {
            self.cancel.reset();
            self.run_item(&mut item).await;
            finished.push(item);
        }
        finished
    }

    /// Tools currently marked mid-install.
    pub fn busy_tools(&self) -> &HashSet<ToolKey> {
        &self.busy
    }

    /// Number of items waiting in the queue.
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    async fn run_item(&mut self, item: &mut QueueItem) {
        item.state = ItemState::ProcessingPrereqs;
        self.reporter.component_step(
            &item.component.id,
            Step::Checking,
            &format!("Preparing {}", item.component.display_name),
        );

        let ctx = InstallContext {
            paths: &self.paths,
            client: &self.client,
            reporter: Arc::clone(&self.reporter),
            cancel: &self.cancel,
            shortcuts: self.shortcuts.as_ref(),
        };

        let unmet = item.unmet.clone();
        for (tool, req) in &unmet {
            item.artifact = req
                .distribution
                .as_ref()
                .map(|d| artifact_name(&d.download_location));
            let result =
                installers::install_tool(&ctx, &mut self.status, &item.component.id, tool, req)
                    .await;
            // The mark is per-tool and released on every terminal path.
            self.busy.remove(tool);
            if let Err(e) = result {
                Self::fail_item(&self.paths, &self.reporter, &mut self.busy, item, &e);
                return;
            }
        }

        item.state = ItemState::ProcessingComponent;
        item.artifact = Some(artifact_name(&installers::archive_url(&item.component)));
        match installers::install_component(&ctx, &mut self.status, &item.family, &item.component)
            .await
        {
            Ok(_) => {
                item.state = ItemState::Done;
                self.reporter.install_complete(&item.component.id);
            }
            Err(e) => {
                Self::fail_item(&self.paths, &self.reporter, &mut self.busy, item, &e);
            }
        }
    }

    /// Terminal failure path: release every mark the item still holds,
    /// best-effort delete the partial component directory, and report.
    /// Cancellation reports with an empty message by convention.
    fn fail_item(
        paths: &Paths,
        reporter: &Arc<dyn Reporter>,
        busy: &mut HashSet<ToolKey>,
        item: &mut QueueItem,
        err: &InstallError,
    ) {
        for (tool, _) in &item.unmet {
            busy.remove(tool);
        }
        let dir = paths.component_dir(&item.family, &item.component.subdir);
        if let Err(e) = std::fs::remove_dir_all(&dir) {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!("could not clean up {}: {e}", dir.display());
            }
        }
        if err.is_cancelled() {
            info!(id = %item.component.id, "install cancelled");
            item.state = ItemState::Cancelled;
            reporter.error(&item.component.id, "");
        } else {
            warn!(id = %item.component.id, "install failed: {err}");
            item.state = ItemState::Failed;
            item.error = Some(err.to_string());
            reporter.error(&item.component.id, &err.to_string());
        }
    }
}

/// Whether any unmet tool installs through a system installer package,
/// which is the only method that runs elevated.
fn requires_elevation(unmet: &[(ToolKey, Requirement)]) -> bool {
    unmet.iter().any(|(_, req)| {
        req.distribution
            .as_ref()
            .is_some_and(|d| matches!(d.install_method, ToolInstallMethod::InstallerPackage))
    })
}

/// Free space in MB on the disk holding the install root.
///
/// Picks the mounted disk with the longest mount point that prefixes the
/// root. An unresolvable root reports `u64::MAX` so the gate degrades to
/// permissive rather than blocking every install.
pub fn free_space_mb(paths: &Paths) -> u64 {
    let root = paths.root();
    let disks = sysinfo::Disks::new_with_refreshed_list();
    disks
        .iter()
        .filter(|d| root.starts_with(d.mount_point()))
        .max_by_key(|d| d.mount_point().as_os_str().len())
        .map_or(u64::MAX, |d| d.available_space() / (1024 * 1024))
}

/// The disk-space gate: an enqueue is allowed iff free space strictly
/// exceeds the required total.
pub fn disk_gate(available_mb: u64, required_mb: u64) -> Result<(), InstallError> {
    if available_mb > required_mb {
        Ok(())
    } else {
        Err(InstallError::InsufficientDiskSpace {
            required_mb,
            available_mb,
        })
    }
}
