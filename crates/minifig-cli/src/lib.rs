//! # minifig-cli
//!
//! Command-line inspector for LDraw minifigure parents tables.
//!
//! This crate renders lookups on a [`PartsHierarchy`] as plain text or
//! JSON for the `minifig-parents` binary.

#![warn(missing_docs)]

use minifig_loader::PartsHierarchy;
use minifig_types::{well_known, AttachPoint, PartId};
use serde::Serialize;

/// Summary printed by `check`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckReport {
    /// Number of parent records.
    pub parents: usize,
    /// Number of groups.
    pub groups: usize,
    /// Distinct parts accepted by any parent.
    pub children: usize,
    /// Attach points across all parents.
    pub attach_points: usize,
    /// Duplicate entries merged while loading.
    pub duplicate_entries: usize,
    /// Lines carrying headers, points or entries.
    pub data_lines: usize,
    /// Standard body parts the table never mentions.
    pub missing_body_parts: Vec<&'static str>,
}

impl CheckReport {
    /// Builds the summary of a hierarchy.
    pub fn new(hierarchy: &PartsHierarchy) -> Self {
        Self {
            parents: hierarchy.parent_count(),
            groups: hierarchy.group_count(),
            children: hierarchy.child_count(),
            attach_points: hierarchy.attach_point_count(),
            duplicate_entries: hierarchy
                .stats()
                .map(|stats| stats.duplicate_entries)
                .unwrap_or_default(),
            data_lines: hierarchy
                .stats()
                .map(|stats| stats.data_lines())
                .unwrap_or_default(),
            missing_body_parts: well_known::BODY_PARTS
                .iter()
                .copied()
                .filter(|id| !hierarchy.is_parent(id) && !hierarchy.is_child(id))
                .collect(),
        }
    }

    /// Renders the summary as text.
    pub fn to_text(&self) -> String {
        let mut text = format!(
            "{} parents, {} groups, {} distinct children, {} attach points, {} duplicate entries ({} data lines)",
            self.parents,
            self.groups,
            self.children,
            self.attach_points,
            self.duplicate_entries,
            self.data_lines
        );
        if !self.missing_body_parts.is_empty() {
            text.push_str("\nmissing body parts: ");
            text.push_str(&self.missing_body_parts.join(", "));
        }
        text
    }
}

/// Answer to a `children` or `points` query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParentReport {
    /// The queried parent.
    pub parent: String,
    /// True if the table has a record for the parent.
    pub known: bool,
    /// Resolved children.
    pub children: Vec<PartId>,
    /// Attach points.
    pub attach_points: Vec<AttachPoint>,
}

impl ParentReport {
    /// Looks up `parent` in the hierarchy.
    pub fn new(hierarchy: &PartsHierarchy, parent: &str) -> Self {
        Self {
            parent: parent.to_string(),
            known: hierarchy.is_parent(parent),
            children: hierarchy.children_of(parent).to_vec(),
            attach_points: hierarchy.attach_points_of(parent).to_vec(),
        }
    }

    /// Renders the children, one per line.
    pub fn children_text(&self) -> String {
        self.children
            .iter()
            .map(PartId::as_str)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Renders the attach points, one `x y z` triple per line.
    pub fn points_text(&self) -> String {
        self.attach_points
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Answer to a `valid` query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidityReport {
    /// The queried parent.
    pub parent: String,
    /// The queried child.
    pub child: String,
    /// True if the child may attach to the parent.
    pub valid: bool,
}

impl ValidityReport {
    /// Checks `child` against `parent`.
    pub fn new(hierarchy: &PartsHierarchy, parent: &str, child: &str) -> Self {
        Self {
            parent: parent.to_string(),
            child: child.to_string(),
            valid: hierarchy.is_valid_child(parent, child),
        }
    }

    /// Renders the answer as text.
    pub fn to_text(&self) -> String {
        let verdict = if self.valid { "fits on" } else { "does not fit on" };
        format!("{} {} {}", self.child, verdict, self.parent)
    }
}
