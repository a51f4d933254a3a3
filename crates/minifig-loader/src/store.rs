//! Resolved, read-only parents hierarchy.
//!
//! Provides attach point and child lookups over a parsed [`PartsTable`].
//! Group references are flattened once at construction, so every lookup is
//! a plain map access.
//!
//! ```ignore
//! let hierarchy = PartsHierarchy::from_path("parents.txt", &HierarchyConfig::default())?;
//!
//! for child in hierarchy.children_of("3626") {
//!     println!("{child} fits on the head");
//! }
//! assert!(hierarchy.is_valid_child("973", "3626"));
//! ```

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fs;
use std::path::Path;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use minifig_types::{AttachPoint, ChildRef, Group, PartId, PartsTable};
use tracing::{trace, warn};

use crate::parser::ParentsParser;
use crate::types::{
    DuplicatePolicy, HierarchyConfig, HierarchyError, HierarchyResult, ParseStats,
};

/// Parents table with every group reference expanded.
///
/// Built once per load and never mutated afterwards; share it behind an
/// `Arc` (see [`HierarchyRegistry`](crate::HierarchyRegistry)).
#[derive(Clone, Default)]
pub struct PartsHierarchy {
    /// The table as parsed, groups unexpanded.
    table: PartsTable,
    /// Flattened, de-duplicated members indexed by group name.
    group_members: HashMap<String, Vec<PartId>>,
    /// Flattened, de-duplicated children indexed by parent.
    children_by_parent: HashMap<PartId, Vec<PartId>>,
    /// Membership sets backing `is_valid_child`.
    child_sets: HashMap<PartId, HashSet<PartId>>,
    /// Reverse index: child -> parents accepting it.
    parents_by_child: HashMap<PartId, Vec<PartId>>,
    /// Parts merged away because another reference of the same list
    /// already provided them.
    merged_duplicates: usize,
    /// Statistics of the parse that produced the table, if any.
    stats: Option<ParseStats>,
}

/// A part reached through more than one reference of a group or parent.
#[derive(Debug, Clone, PartialEq, Eq)]
struct MergedPart {
    owner: String,
    part: PartId,
}

impl std::fmt::Debug for PartsHierarchy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PartsHierarchy")
            .field("groups", &self.table.groups.len())
            .field("parents", &self.table.parents.len())
            .field("parents_by_child", &self.parents_by_child.len())
            .field("merged_duplicates", &self.merged_duplicates)
            .finish()
    }
}

impl PartsHierarchy {
    /// Resolves a parsed table with the default configuration.
    ///
    /// # Errors
    /// Returns [`HierarchyError::CyclicGroup`] if any group reaches itself,
    /// and [`HierarchyError::UnknownGroup`] if a reference names no group.
    pub fn from_table(table: PartsTable) -> HierarchyResult<Self> {
        Self::resolve(table, &HierarchyConfig::default())
    }

    /// Resolves a parsed table.
    ///
    /// A part that reaches a list through several references (a group and a
    /// literal entry, or two overlapping groups) is kept once and counted in
    /// [`merged_duplicates`](Self::merged_duplicates); under
    /// [`DuplicatePolicy::Warn`] each merge is logged.
    ///
    /// # Errors
    /// Same as [`from_table`](Self::from_table).
    pub fn resolve(table: PartsTable, config: &HierarchyConfig) -> HierarchyResult<Self> {
        let (group_members, mut merged) = expand_all_groups(&table.groups)?;

        for record in table.parents.values() {
            for name in record.group_refs() {
                if !group_members.contains_key(name) {
                    return Err(HierarchyError::UnknownGroup {
                        name: name.to_string(),
                        referenced_by: record.id.to_string(),
                    });
                }
            }
        }

        #[cfg(feature = "parallel")]
        let flattened: Vec<(PartId, Flattened)> = table
            .parents
            .par_iter()
            .map(|(id, record)| (id.clone(), flatten(&record.children, &group_members)))
            .collect();

        #[cfg(not(feature = "parallel"))]
        let flattened: Vec<(PartId, Flattened)> = table
            .parents
            .iter()
            .map(|(id, record)| (id.clone(), flatten(&record.children, &group_members)))
            .collect();

        let mut children_by_parent = HashMap::with_capacity(flattened.len());
        let mut child_sets = HashMap::with_capacity(flattened.len());
        let mut parents_by_child: HashMap<PartId, Vec<PartId>> = HashMap::new();

        for (parent, Flattened { ids: children, repeated }) in flattened {
            merged.extend(repeated.into_iter().map(|part| MergedPart {
                owner: parent.to_string(),
                part,
            }));

            for child in &children {
                parents_by_child
                    .entry(child.clone())
                    .or_default()
                    .push(parent.clone());
            }
            child_sets.insert(parent.clone(), children.iter().cloned().collect());
            children_by_parent.insert(parent, children);
        }

        if config.duplicates == DuplicatePolicy::Warn {
            for dup in &merged {
                warn!(owner = %dup.owner, part = %dup.part, "part listed more than once");
            }
        }

        Ok(Self {
            table,
            group_members,
            children_by_parent,
            child_sets,
            parents_by_child,
            merged_duplicates: merged.len(),
            stats: None,
        })
    }

    /// Parses and resolves the text of a parents file.
    pub fn parse(text: &str, config: &HierarchyConfig) -> HierarchyResult<Self> {
        let mut parser = ParentsParser::new(config.clone());
        let table = parser.parse(text)?;
        let mut hierarchy = Self::resolve(table, config)?;

        let mut stats = parser.stats().clone();
        stats.duplicate_entries += hierarchy.merged_duplicates;
        hierarchy.stats = Some(stats);
        Ok(hierarchy)
    }

    /// Reads, parses and resolves a parents file.
    ///
    /// # Errors
    /// Returns an error if the file is missing or unreadable, or if its
    /// content fails to parse or resolve.
    pub fn from_path<P: AsRef<Path>>(path: P, config: &HierarchyConfig) -> HierarchyResult<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(HierarchyError::FileNotFound {
                path: path.display().to_string(),
            });
        }

        let text = fs::read_to_string(path)?;
        Self::parse(&text, config)
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // LOOKUPS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Returns every part that may attach to `parent`, groups flattened,
    /// in declaration order with duplicates removed.
    ///
    /// Unknown parents yield an empty slice.
    pub fn children_of(&self, parent: &str) -> &[PartId] {
        match self.children_by_parent.get(parent) {
            Some(children) => children.as_slice(),
            None => {
                trace!(parent, "lookup on unknown parent");
                &[]
            }
        }
    }

    /// Returns the attach points of `parent` in declaration order.
    ///
    /// Unknown parents, and parents declaring none, yield an empty slice.
    pub fn attach_points_of(&self, parent: &str) -> &[AttachPoint] {
        match self.table.parent(parent) {
            Some(record) => record.attach_points.as_slice(),
            None => {
                trace!(parent, "lookup on unknown parent");
                &[]
            }
        }
    }

    /// Returns true if `child` may attach to `parent`.
    pub fn is_valid_child(&self, parent: &str, child: &str) -> bool {
        self.child_sets
            .get(parent)
            .is_some_and(|set| set.contains(child))
    }

    /// Returns the flattened members of a group.
    pub fn group_members(&self, name: &str) -> Option<&[PartId]> {
        self.group_members.get(name).map(Vec::as_slice)
    }

    /// Returns the parents that accept `child`, in parent id order.
    pub fn parents_of(&self, child: &str) -> &[PartId] {
        self.parents_by_child
            .get(child)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Returns true if `id` has a parent record.
    pub fn is_parent(&self, id: &str) -> bool {
        self.table.parents.contains_key(id)
    }

    /// Returns true if `id` may attach to at least one parent.
    pub fn is_child(&self, id: &str) -> bool {
        self.parents_by_child.contains_key(id)
    }

    /// Iterates over parent ids in sorted order.
    pub fn parent_ids(&self) -> impl Iterator<Item = &PartId> {
        self.table.parents.keys()
    }

    /// Returns the unexpanded table.
    pub fn table(&self) -> &PartsTable {
        &self.table
    }

    /// Returns parse statistics when the hierarchy was built from text.
    pub fn stats(&self) -> Option<&ParseStats> {
        self.stats.as_ref()
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // STATISTICS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Returns the number of parent records.
    pub fn parent_count(&self) -> usize {
        self.table.parents.len()
    }

    /// Returns the number of groups.
    pub fn group_count(&self) -> usize {
        self.table.groups.len()
    }

    /// Returns the number of distinct parts accepted by any parent.
    pub fn child_count(&self) -> usize {
        self.parents_by_child.len()
    }

    /// Returns how many parts were merged away during group expansion and
    /// flattening. Literal repeats of one line are counted by the parser.
    pub fn merged_duplicates(&self) -> usize {
        self.merged_duplicates
    }

    /// Returns the number of attach points across all parents.
    pub fn attach_point_count(&self) -> usize {
        self.table
            .parents
            .values()
            .map(|record| record.attach_points.len())
            .sum()
    }
}

impl std::str::FromStr for PartsHierarchy {
    type Err = HierarchyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s, &HierarchyConfig::default())
    }
}

/// Expands every group, detecting cycles and unknown references.
///
/// Groups are visited in name order so the reported cycle is stable.
fn expand_all_groups(
    groups: &BTreeMap<String, Group>,
) -> HierarchyResult<(HashMap<String, Vec<PartId>>, Vec<MergedPart>)> {
    let mut expanded = HashMap::with_capacity(groups.len());
    let mut merged = Vec::new();
    let mut path = Vec::new();

    for name in groups.keys() {
        expand_group(name, groups, &mut expanded, &mut merged, &mut path)?;
    }

    Ok((expanded, merged))
}

/// Depth-first expansion of one group.
///
/// `path` holds the groups currently being expanded; meeting one of them
/// again closes a cycle.
fn expand_group(
    name: &str,
    groups: &BTreeMap<String, Group>,
    expanded: &mut HashMap<String, Vec<PartId>>,
    merged: &mut Vec<MergedPart>,
    path: &mut Vec<String>,
) -> HierarchyResult<()> {
    if expanded.contains_key(name) {
        return Ok(());
    }

    if let Some(start) = path.iter().position(|n| n == name) {
        let mut chain = path[start..].to_vec();
        chain.push(name.to_string());
        return Err(HierarchyError::CyclicGroup { chain });
    }

    let group = groups.get(name).ok_or_else(|| HierarchyError::UnknownGroup {
        name: name.to_string(),
        referenced_by: path.last().cloned().unwrap_or_default(),
    })?;

    path.push(name.to_string());
    for member in &group.members {
        if let ChildRef::Group(inner) = member {
            expand_group(inner, groups, expanded, merged, path)?;
        }
    }
    path.pop();

    let Flattened { ids, repeated } = flatten(&group.members, expanded);
    merged.extend(repeated.into_iter().map(|part| MergedPart {
        owner: name.to_string(),
        part,
    }));
    expanded.insert(name.to_string(), ids);
    Ok(())
}

/// Result of flattening one reference list.
#[derive(Debug, Default)]
struct Flattened {
    /// Parts in first-occurrence order.
    ids: Vec<PartId>,
    /// Parts dropped because an earlier, different reference supplied them.
    repeated: Vec<PartId>,
}

/// Flattens child references using already expanded groups, keeping the
/// first occurrence of each part.
///
/// A reference repeated verbatim is skipped without being reported again.
fn flatten(refs: &[ChildRef], expanded: &HashMap<String, Vec<PartId>>) -> Flattened {
    let mut seen_refs = HashSet::new();
    let mut seen = HashSet::new();
    let mut out = Flattened::default();

    let mut push = |id: &PartId| {
        if seen.insert(id.clone()) {
            out.ids.push(id.clone());
        } else {
            out.repeated.push(id.clone());
        }
    };

    for child in refs {
        if !seen_refs.insert(child) {
            continue;
        }
        match child {
            ChildRef::Part(id) => push(id),
            ChildRef::Group(name) => {
                for id in expanded.get(name).into_iter().flatten() {
                    push(id);
                }
            }
        }
    }

    out
}
