//! Implicit minifig parenting.
//!
//! After a model is imported, every minifig part is a sibling in the scene.
//! This module decides which parts should become children of which: a child
//! object is linked to a parent object when the child's part number is a
//! valid child of the parent's part number and the child's origin sits on
//! one of the parent's attach points, within a tolerance.
//!
//! The host supplies world transforms through [`SceneObject`] and applies
//! the returned [`ParentLink`]s itself.

use std::collections::HashMap;

use nalgebra::{Matrix4, Point3};
use tracing::debug;

use crate::store::PartsHierarchy;
use crate::types::HierarchyConfig;

/// Prefix of mesh data names created for imported parts.
pub const MESH_PREFIX: &str = "Mesh_";

/// Separator between a numbering prefix and the part file name.
const NAME_SEPARATOR: &str = " - ";

/// An object in the host scene.
pub trait SceneObject {
    /// Unique object name.
    fn name(&self) -> &str;

    /// Name of the mesh data, or `None` for non-mesh objects.
    fn mesh_name(&self) -> Option<&str>;

    /// Object-to-world transform.
    fn world_matrix(&self) -> Matrix4<f64>;
}

/// A parent assignment computed for the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParentLink {
    /// Name of the parent object.
    pub parent: String,
    /// Name of the object to re-parent.
    pub child: String,
}

/// Extracts the bare part number from an imported mesh name.
///
/// Mesh names look like `Mesh_3626bp01.dat` or `Mesh_00012 - 973p01.dat`.
/// The part number is an optional leading letter followed by digits.
///
/// ```
/// use minifig_loader::part_number_from_mesh_name;
///
/// assert_eq!(part_number_from_mesh_name("Mesh_3626bp01.dat"), Some("3626"));
/// assert_eq!(part_number_from_mesh_name("Mesh_00012 - u9024.dat"), Some("u9024"));
/// assert_eq!(part_number_from_mesh_name("Cube"), None);
/// ```
pub fn part_number_from_mesh_name(name: &str) -> Option<&str> {
    let rest = name.strip_prefix(MESH_PREFIX)?;
    let rest = match rest.split_once(NAME_SEPARATOR) {
        Some((_, file)) => file,
        None => rest,
    };

    let bytes = rest.as_bytes();
    let start = usize::from(bytes.first().is_some_and(u8::is_ascii_alphabetic));
    let digits = bytes[start..]
        .iter()
        .take_while(|b| b.is_ascii_digit())
        .count();

    if digits == 0 {
        return None;
    }
    Some(&rest[..start + digits])
}

/// Planner for implicit parent links.
#[derive(Debug, Clone)]
pub struct ImplicitParenting {
    /// When false, [`plan`](Self::plan) returns no links.
    pub enabled: bool,
    /// LDraw units to scene units.
    pub scale_factor: f64,
    /// Snap tolerance in LDraw units.
    pub tolerance_ldu: f64,
}

impl Default for ImplicitParenting {
    fn default() -> Self {
        Self::from(&HierarchyConfig::default())
    }
}

impl From<&HierarchyConfig> for ImplicitParenting {
    fn from(config: &HierarchyConfig) -> Self {
        Self {
            enabled: true,
            scale_factor: config.scale_factor,
            tolerance_ldu: config.tolerance_ldu,
        }
    }
}

/// A scene object whose part number the hierarchy knows about.
struct Candidate<'a, O> {
    object: &'a O,
    part: &'a str,
}

impl ImplicitParenting {
    /// Returns the snap tolerance converted to scene units.
    pub fn scene_tolerance(&self) -> f64 {
        self.tolerance_ldu * self.scale_factor
    }

    /// Computes parent links for the given scene objects.
    ///
    /// When a child matches several parents the last match wins, and each
    /// child appears at most once in the result, at the position of its
    /// first match.
    pub fn plan<O: SceneObject>(&self, hierarchy: &PartsHierarchy, objects: &[O]) -> Vec<ParentLink> {
        if !self.enabled {
            return Vec::new();
        }

        let mut parents = Vec::new();
        let mut children = Vec::new();
        for object in objects {
            let Some(part) = object.mesh_name().and_then(part_number_from_mesh_name) else {
                continue;
            };
            if hierarchy.is_parent(part) {
                parents.push(Candidate { object, part });
            }
            if hierarchy.is_child(part) {
                children.push(Candidate { object, part });
            }
        }

        let tolerance = self.scene_tolerance();
        let squared_tolerance = tolerance * tolerance;

        let mut links: Vec<ParentLink> = Vec::new();
        let mut index_by_child: HashMap<&str, usize> = HashMap::new();

        for parent in &parents {
            let points = hierarchy.attach_points_of(parent.part);
            if points.is_empty() {
                continue;
            }

            let matrix = parent.object.world_matrix();
            let slots: Vec<Point3<f64>> = points
                .iter()
                .map(|p| matrix.transform_point(&Point3::from(p.scaled(self.scale_factor).to_array())))
                .collect();

            for child in &children {
                if child.object.name() == parent.object.name()
                    || !hierarchy.is_valid_child(parent.part, child.part)
                {
                    continue;
                }

                let location = translation(&child.object.world_matrix());
                let snapped = slots
                    .iter()
                    .any(|slot| nalgebra::distance_squared(slot, &location) <= squared_tolerance);
                if !snapped {
                    continue;
                }

                let link = ParentLink {
                    parent: parent.object.name().to_string(),
                    child: child.object.name().to_string(),
                };
                match index_by_child.get(child.object.name()) {
                    Some(&index) => links[index] = link,
                    None => {
                        index_by_child.insert(child.object.name(), links.len());
                        links.push(link);
                    }
                }
            }
        }

        debug!(
            parents = parents.len(),
            children = children.len(),
            links = links.len(),
            "planned implicit minifig parenting"
        );
        links
    }
}

/// Returns the translation column of an affine transform as a point.
fn translation(matrix: &Matrix4<f64>) -> Point3<f64> {
    Point3::new(matrix[(0, 3)], matrix[(1, 3)], matrix[(2, 3)])
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::{Rotation3, Vector3};

    const SAMPLE: &str = include_str!("../data/parents.txt");

    struct TestObject {
        name: &'static str,
        mesh: Option<&'static str>,
        matrix: Matrix4<f64>,
    }

    impl SceneObject for TestObject {
        fn name(&self) -> &str {
            self.name
        }

        fn mesh_name(&self) -> Option<&str> {
            self.mesh
        }

        fn world_matrix(&self) -> Matrix4<f64> {
            self.matrix
        }
    }

    fn at(name: &'static str, mesh: &'static str, x: f64, y: f64, z: f64) -> TestObject {
        TestObject {
            name,
            mesh: Some(mesh),
            matrix: Matrix4::new_translation(&Vector3::new(x, y, z)),
        }
    }

    /// Planner working directly in LDraw units.
    fn unit_planner() -> ImplicitParenting {
        ImplicitParenting {
            enabled: true,
            scale_factor: 1.0,
            tolerance_ldu: 5.0,
        }
    }

    #[test]
    fn test_part_number_from_mesh_name() {
        assert_eq!(part_number_from_mesh_name("Mesh_973p01.dat"), Some("973"));
        assert_eq!(part_number_from_mesh_name("Mesh_3626"), Some("3626"));
        assert_eq!(part_number_from_mesh_name("Mesh_00001 - 3626bp01.dat"), Some("3626"));
        assert_eq!(part_number_from_mesh_name("Mesh_u9024.dat"), Some("u9024"));
        assert_eq!(part_number_from_mesh_name("Mesh_s01.dat"), Some("s01"));
        assert_eq!(part_number_from_mesh_name("Mesh_stud.dat"), None);
        assert_eq!(part_number_from_mesh_name("Mesh_"), None);
        assert_eq!(part_number_from_mesh_name("973.dat"), None);
    }

    #[test]
    fn test_head_snaps_to_torso() {
        let hierarchy: PartsHierarchy = SAMPLE.parse().unwrap();
        let objects = vec![
            at("torso", "Mesh_973.dat", 10.0, 0.0, 0.0),
            at("head", "Mesh_3626.dat", 10.0, -24.0, 1.0),
            at("far_head", "Mesh_3626.dat", 100.0, -24.0, 0.0),
        ];

        let links = unit_planner().plan(&hierarchy, &objects);
        assert_eq!(
            links,
            vec![ParentLink {
                parent: "torso".into(),
                child: "head".into(),
            }]
        );
    }

    #[test]
    fn test_attach_points_follow_parent_rotation() {
        let hierarchy: PartsHierarchy = SAMPLE.parse().unwrap();
        // Half turn around Z maps the hips point (0, 32, 0) to (0, -32, 0).
        let rotation = Rotation3::from_axis_angle(&Vector3::z_axis(), std::f64::consts::PI);
        let objects = vec![
            TestObject {
                name: "torso",
                mesh: Some("Mesh_973.dat"),
                matrix: rotation.to_homogeneous(),
            },
            at("hips", "Mesh_970.dat", 0.0, -32.0, 0.0),
        ];

        let links = unit_planner().plan(&hierarchy, &objects);
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].child, "hips");
    }

    #[test]
    fn test_tolerance_is_inclusive_and_scaled() {
        let hierarchy: PartsHierarchy = SAMPLE.parse().unwrap();
        let planner = ImplicitParenting {
            enabled: true,
            scale_factor: 0.5,
            tolerance_ldu: 4.0,
        };
        // Hips point (0, 32, 0) scales to (0, 16, 0); tolerance is 2 scene units.
        let on_edge = vec![at("torso", "Mesh_973.dat", 0.0, 0.0, 0.0), at("hips", "Mesh_970.dat", 0.0, 18.0, 0.0)];
        assert_eq!(planner.plan(&hierarchy, &on_edge).len(), 1);

        let outside = vec![at("torso", "Mesh_973.dat", 0.0, 0.0, 0.0), at("hips", "Mesh_970.dat", 0.0, 18.5, 0.0)];
        assert!(planner.plan(&hierarchy, &outside).is_empty());
    }

    #[test]
    fn test_invalid_child_not_linked() {
        let hierarchy: PartsHierarchy = SAMPLE.parse().unwrap();
        // A hand sitting on the torso neck is not a torso child.
        let objects = vec![
            at("torso", "Mesh_973.dat", 0.0, 0.0, 0.0),
            at("hand", "Mesh_977.dat", 0.0, -24.0, 0.0),
        ];
        assert!(unit_planner().plan(&hierarchy, &objects).is_empty());
    }

    #[test]
    fn test_chain_of_links() {
        let hierarchy: PartsHierarchy = SAMPLE.parse().unwrap();
        let objects = vec![
            at("torso", "Mesh_973.dat", 0.0, 0.0, 0.0),
            at("arm", "Mesh_975.dat", -15.552, 9.0, 0.0),
            at("hand", "Mesh_977.dat", -37.552, 25.1213, 20.8787),
            at("cube", "Cube", 0.0, 0.0, 0.0),
        ];

        let links = unit_planner().plan(&hierarchy, &objects);
        assert_eq!(links.len(), 2);
        assert!(links.contains(&ParentLink {
            parent: "torso".into(),
            child: "arm".into()
        }));
        assert!(links.contains(&ParentLink {
            parent: "arm".into(),
            child: "hand".into()
        }));
    }

    #[test]
    fn test_last_matching_parent_wins() {
        let hierarchy: PartsHierarchy = SAMPLE.parse().unwrap();
        let objects = vec![
            at("torso_a", "Mesh_973.dat", 0.0, 0.0, 0.0),
            at("torso_b", "Mesh_973.dat", 0.0, 1.0, 0.0),
            at("head", "Mesh_3626.dat", 0.0, -23.5, 0.0),
        ];

        let links = unit_planner().plan(&hierarchy, &objects);
        assert_eq!(
            links,
            vec![ParentLink {
                parent: "torso_b".into(),
                child: "head".into(),
            }]
        );
    }

    #[test]
    fn test_scene_tolerance() {
        let planner = ImplicitParenting::default();
        assert!((planner.scene_tolerance() - 0.002).abs() < 1e-12);
        assert_eq!(unit_planner().scene_tolerance(), unit_planner().tolerance_ldu);
    }

    #[test]
    fn test_disabled_planner() {
        let hierarchy: PartsHierarchy = SAMPLE.parse().unwrap();
        let objects = vec![
            at("torso", "Mesh_973.dat", 0.0, 0.0, 0.0),
            at("head", "Mesh_3626.dat", 0.0, -24.0, 0.0),
        ];
        let planner = ImplicitParenting {
            enabled: false,
            ..unit_planner()
        };
        assert!(planner.plan(&hierarchy, &objects).is_empty());
    }
}
