//! Prerequisite resolution.
//!
//! Pure read over the prerequisite document and the status document:
//! which tools does this component need, are they satisfied by what is
//! detected on the machine, and which distribution artifact would we
//! install if not. Disk-space aggregation and user confirmation are the
//! orchestrator's job.

use crate::error::InstallError;
use indexmap::IndexMap;
use sdkforge_schema::{
    ComponentId, ComponentType, Constraint, ConstraintOp, Distribution, Os, PrereqFile, SdkFamily,
    StatusDoc, ToolKey, Version,
};
use tracing::debug;

/// Resolution result for one required tool.
#[derive(Debug, Clone)]
pub struct Requirement {
    /// Human-readable tool name.
    pub display_name: String,
    /// The parsed constraint the component declares.
    pub constraint: Constraint,
    /// Version currently detected on the machine; empty if never detected.
    pub detected_version: Version,
    /// Whether the detected version satisfies the constraint.
    pub satisfied: bool,
    /// The distribution that would be installed. Present whenever the
    /// constraint is satisfiable at all, satisfied or not.
    pub distribution: Option<Distribution>,
    /// Whether the tool installs machine-wide or component-local.
    pub global: bool,
}

/// Resolve the prerequisite set of one component on one OS.
///
/// The returned map preserves the declaration order of the requirement
/// set. A component type with no requirement entry resolves to an empty
/// map. A constraint with no selectable distribution is a blocking
/// [`InstallError::Unsatisfiable`], never a silent skip.
pub fn resolve(
    prereq: &PrereqFile,
    status: &StatusDoc,
    family: &SdkFamily,
    ctype: &ComponentType,
    comp_uid: &ComponentId,
    os: Os,
) -> Result<IndexMap<ToolKey, Requirement>, InstallError> {
    let mut out = IndexMap::new();
    let Some(set) = prereq.requirements(family, ctype, os, comp_uid) else {
        debug!(%family, %ctype, %comp_uid, "no prerequisite entry");
        return Ok(out);
    };

    for (tool, raw_constraint) in set {
        let constraint = Constraint::parse(raw_constraint).map_err(|_| {
            InstallError::Unsatisfiable {
                tool: tool.clone(),
                constraint: raw_constraint.clone(),
            }
        })?;

        let detected = status.tool_version(tool);
        let satisfied = constraint.matches(&detected);

        let distribution = select_distribution(prereq, tool, os, &constraint);
        if distribution.is_none() {
            // Even a satisfied requirement with no artifact is a config
            // hole we refuse to proceed past when unsatisfied.
            if !satisfied {
                return Err(InstallError::Unsatisfiable {
                    tool: tool.clone(),
                    constraint: raw_constraint.clone(),
                });
            }
        }

        let info = prereq.tools.get(tool);
        out.insert(
            tool.clone(),
            Requirement {
                display_name: info
                    .map(|i| i.display_name.clone())
                    .unwrap_or_else(|| tool.to_string()),
                constraint,
                detected_version: detected,
                satisfied,
                distribution,
                global: info.map(|i| i.global).unwrap_or(true),
            },
        );
    }
    Ok(out)
}

/// Pick the best distribution for a constraint:
/// `=` selects the exact version, every other operator selects the
/// highest available version that satisfies it.
fn select_distribution(
    prereq: &PrereqFile,
    tool: &ToolKey,
    os: Os,
    constraint: &Constraint,
) -> Option<Distribution> {
    let candidates = prereq.distributions_for(tool, os);
    match constraint.op {
        ConstraintOp::Exact => candidates
            .into_iter()
            .find(|d| d.version == constraint.version)
            .cloned(),
        _ => candidates
            .into_iter()
            .filter(|d| constraint.matches(&d.version))
            .max_by(|a, b| a.version.cmp(&b.version))
            .cloned(),
    }
}
