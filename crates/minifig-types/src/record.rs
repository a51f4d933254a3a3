//! Group and parent records of a parents table.
//!
//! These are the parsed, unexpanded records: a parent's child list still
//! names groups rather than their members. Expansion lives in the loader.

use std::collections::BTreeMap;

use crate::{AttachPoint, PartId};

/// One entry of a group member list or a parent child list.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ChildRef {
    /// A literal part.
    Part(PartId),
    /// A reference to a named group, expanded on resolution.
    Group(String),
}

impl ChildRef {
    /// Returns the part identifier if this is a literal part.
    pub fn as_part(&self) -> Option<&PartId> {
        match self {
            Self::Part(id) => Some(id),
            Self::Group(_) => None,
        }
    }

    /// Returns the group name if this is a group reference.
    pub fn as_group(&self) -> Option<&str> {
        match self {
            Self::Part(_) => None,
            Self::Group(name) => Some(name),
        }
    }
}

/// A named, reusable list of child references.
///
/// # Examples
///
/// ```
/// use minifig_types::{ChildRef, Group, PartId};
///
/// let group = Group {
///     name: "MinifigCaps".to_string(),
///     members: vec![ChildRef::Part("4485".parse().unwrap())],
/// };
/// assert_eq!(group.members[0].as_part().map(PartId::as_str), Some("4485"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Group {
    /// Unique group name.
    pub name: String,
    /// Members in declaration order; may reference other groups.
    pub members: Vec<ChildRef>,
}

/// A parent part with its attach points and allowed children.
///
/// Attach points belong to the parent as a whole: any point may receive
/// any listed child.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ParentRecord {
    /// Parent part identifier.
    pub id: PartId,
    /// Attach points in declaration order.
    pub attach_points: Vec<AttachPoint>,
    /// Children in declaration order, groups unexpanded.
    pub children: Vec<ChildRef>,
}

impl ParentRecord {
    /// Creates a parent record with no attach points or children.
    pub fn new(id: PartId) -> Self {
        Self {
            id,
            attach_points: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Returns the names of groups referenced directly by this parent.
    pub fn group_refs(&self) -> impl Iterator<Item = &str> {
        self.children.iter().filter_map(ChildRef::as_group)
    }
}

/// The parsed content of a parents file.
///
/// Both maps are ordered by key so that iteration is deterministic.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PartsTable {
    /// Groups indexed by name.
    pub groups: BTreeMap<String, Group>,
    /// Parent records indexed by parent part identifier.
    pub parents: BTreeMap<PartId, ParentRecord>,
}

impl PartsTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the group with the given name.
    pub fn group(&self, name: &str) -> Option<&Group> {
        self.groups.get(name)
    }

    /// Returns the parent record for the given part identifier.
    pub fn parent(&self, id: &str) -> Option<&ParentRecord> {
        self.parents.get(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn part(id: &str) -> PartId {
        PartId::new(id).unwrap()
    }

    #[test]
    fn test_child_ref_accessors() {
        let p = ChildRef::Part(part("3626"));
        let g = ChildRef::Group("MinifigHair".to_string());
        assert_eq!(p.as_part(), Some(&part("3626")));
        assert_eq!(p.as_group(), None);
        assert_eq!(g.as_group(), Some("MinifigHair"));
        assert_eq!(g.as_part(), None);
    }

    #[test]
    fn test_parent_group_refs() {
        let mut record = ParentRecord::new(part("3626"));
        record.children.push(ChildRef::Group("MinifigHair".to_string()));
        record.children.push(ChildRef::Part(part("6158")));
        record.children.push(ChildRef::Group("MinifigHats".to_string()));

        let refs: Vec<_> = record.group_refs().collect();
        assert_eq!(refs, vec!["MinifigHair", "MinifigHats"]);
    }

    #[test]
    fn test_table_lookup_by_str() {
        let mut table = PartsTable::new();
        table
            .parents
            .insert(part("973"), ParentRecord::new(part("973")));
        assert!(table.parent("973").is_some());
        assert!(table.parent("~973").is_none());
    }
}
