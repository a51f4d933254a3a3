//! # minifig-types
//!
//! Type definitions for LDraw minifigure parent/child attachment tables.
//!
//! A parents table lists, for each parent part, the local-space points at
//! which children may attach and the parts (or named groups of parts) that
//! may attach there.
//!
//! ## Features
//!
//! - `serde` (default): Enables serialization/deserialization support via serde.
//!   Disable this feature for zero-dependency usage.
//!
//! ## Usage
//!
//! ```rust
//! use minifig_types::{AttachPoint, ChildRef, ParentRecord, PartId};
//! use minifig_types::well_known;
//!
//! let mut torso = ParentRecord::new(PartId::new(well_known::TORSO).unwrap());
//! torso.attach_points.push(AttachPoint::new(0.0, 0.0, 0.0));
//! torso.children.push(ChildRef::Part(PartId::new(well_known::HEAD).unwrap()));
//!
//! assert_eq!(torso.children.len(), 1);
//! ```

#![warn(missing_docs)]

mod attach_point;
mod enums;
mod part_id;
mod record;
pub mod well_known;

// Re-export all public types at crate root
pub use attach_point::AttachPoint;
pub use enums::PartPrefix;
pub use part_id::{PartId, PartIdError};
pub use record::{ChildRef, Group, ParentRecord, PartsTable};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_types_are_exported() {
        let _id: PartId = "3626".parse().unwrap();
        let _prefix = PartPrefix::Obsolete;
        let _point = AttachPoint::default();
        let _table = PartsTable::new();
    }

    #[test]
    fn test_well_known_accessible() {
        assert_eq!(well_known::TORSO, "973");
        assert_eq!(well_known::HEAD, "3626");
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_serde_roundtrip() {
        let mut record = ParentRecord::new(PartId::new("975").unwrap());
        record
            .attach_points
            .push(AttachPoint::new(-22.0, 16.1213, 20.8787));
        record.children.push(ChildRef::Part(PartId::new("977").unwrap()));
        record
            .children
            .push(ChildRef::Group("MinifigHands".to_string()));

        let json = serde_json::to_string(&record).unwrap();
        let parsed: ParentRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(record, parsed);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_part_id_serializes_as_string() {
        let id = PartId::new("u9024").unwrap();
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"u9024\"");
    }
}
