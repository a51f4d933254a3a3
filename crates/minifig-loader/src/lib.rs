//! # minifig-loader
//!
//! Parser and resolver for LDraw minifigure parents tables.
//!
//! A parents table tells an importer which minifig parts plug into which
//! (hair onto heads, hands into arms, ...) and at what local offset. This
//! crate parses the table, flattens its named groups, and answers
//! attach-point lookups:
//!
//! ```
//! use minifig_loader::{HierarchyConfig, PartsHierarchy};
//!
//! let text = "\
//! Group MinifigHands:
//! 977
//! 983
//!
//! Parent 975:   # Arm
//! -22 16.1213 20.8787
//! MinifigHands
//! ";
//!
//! let hierarchy = PartsHierarchy::parse(text, &HierarchyConfig::default()).unwrap();
//! assert!(hierarchy.is_valid_child("975", "983"));
//! assert_eq!(hierarchy.attach_points_of("975").len(), 1);
//! assert!(hierarchy.children_of("973").is_empty());
//! ```
//!
//! ## Features
//!
//! - `parallel` (default): flattens parent child lists with rayon.

#![warn(missing_docs)]

pub mod export;
pub mod implicit;
pub mod loader;
pub mod parser;
pub mod registry;
pub mod store;
pub mod types;

pub use export::write_tsv;
pub use implicit::{part_number_from_mesh_name, ImplicitParenting, ParentLink, SceneObject};
pub use loader::{discover_parents_file, resolve_parents_path, PARENTS_FILE_NAME};
pub use parser::{parse_table, ParentsParser};
pub use registry::HierarchyRegistry;
pub use store::PartsHierarchy;
pub use types::{
    DuplicatePolicy, HierarchyConfig, HierarchyError, HierarchyResult, ParseStats,
};

// Re-export minifig-types for convenience
pub use minifig_types;
