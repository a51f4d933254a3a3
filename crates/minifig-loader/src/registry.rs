//! Process-wide holder of the active parents hierarchy.
//!
//! The registry hands out `Arc` snapshots. A reload parses and resolves the
//! new table completely before swapping it in, so readers see either the old
//! table or the new one, and a failed reload leaves the old one active.

use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::SystemTime;

use minifig_types::{AttachPoint, PartId};
use tracing::{info, warn};

use crate::store::PartsHierarchy;
use crate::types::{HierarchyConfig, HierarchyResult};

/// Where the active snapshot was loaded from.
#[derive(Debug, Clone)]
struct Source {
    path: PathBuf,
    modified: Option<SystemTime>,
}

/// The active snapshot together with its origin, swapped as one value.
#[derive(Debug, Clone)]
struct Active {
    hierarchy: Arc<PartsHierarchy>,
    source: Option<Source>,
}

/// Shared, reloadable parents hierarchy.
///
/// # Example
///
/// ```ignore
/// let registry = HierarchyRegistry::new(HierarchyConfig::default());
/// registry.reload("parents.txt")?;
///
/// let snapshot = registry.snapshot().expect("loaded");
/// assert!(snapshot.is_valid_child("973", "3626"));
/// ```
#[derive(Debug, Default)]
pub struct HierarchyRegistry {
    config: HierarchyConfig,
    active: RwLock<Option<Active>>,
}

impl HierarchyRegistry {
    /// Creates an empty registry.
    pub fn new(config: HierarchyConfig) -> Self {
        Self {
            config,
            active: RwLock::new(None),
        }
    }

    /// Creates a registry that starts with the given hierarchy.
    pub fn with_hierarchy(config: HierarchyConfig, hierarchy: PartsHierarchy) -> Self {
        Self {
            config,
            active: RwLock::new(Some(Active {
                hierarchy: Arc::new(hierarchy),
                source: None,
            })),
        }
    }

    /// Returns the registry configuration.
    pub fn config(&self) -> &HierarchyConfig {
        &self.config
    }

    /// Returns the active hierarchy, if one has been loaded.
    pub fn snapshot(&self) -> Option<Arc<PartsHierarchy>> {
        self.active
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(|active| active.hierarchy.clone())
    }

    /// Returns true if a hierarchy is active.
    pub fn is_loaded(&self) -> bool {
        self.snapshot().is_some()
    }

    /// Returns the file the active hierarchy was loaded from.
    pub fn source_path(&self) -> Option<PathBuf> {
        self.source().map(|source| source.path)
    }

    /// Re-parses `path` and makes it the active hierarchy.
    ///
    /// # Errors
    /// Returns the parse or resolution error; the previous hierarchy stays
    /// active in that case.
    pub fn reload<P: AsRef<Path>>(&self, path: P) -> HierarchyResult<Arc<PartsHierarchy>> {
        let path = path.as_ref();
        let modified = std::fs::metadata(path).and_then(|m| m.modified()).ok();

        let hierarchy = match PartsHierarchy::from_path(path, &self.config) {
            Ok(hierarchy) => Arc::new(hierarchy),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "reload failed, keeping previous table");
                return Err(e);
            }
        };

        self.install(
            hierarchy.clone(),
            Some(Source {
                path: path.to_path_buf(),
                modified,
            }),
        );

        info!(
            path = %path.display(),
            parents = hierarchy.parent_count(),
            groups = hierarchy.group_count(),
            "loaded parents table"
        );
        Ok(hierarchy)
    }

    /// Parses `text` and makes it the active hierarchy.
    ///
    /// Clears the recorded source path on success.
    pub fn reload_from_str(&self, text: &str) -> HierarchyResult<Arc<PartsHierarchy>> {
        let hierarchy = match PartsHierarchy::parse(text, &self.config) {
            Ok(hierarchy) => Arc::new(hierarchy),
            Err(e) => {
                warn!(error = %e, "reload failed, keeping previous table");
                return Err(e);
            }
        };

        self.install(hierarchy.clone(), None);
        Ok(hierarchy)
    }

    /// Reloads from the recorded source if the file changed since loading.
    ///
    /// Returns `Ok(true)` if a reload happened.
    pub fn refresh(&self) -> HierarchyResult<bool> {
        let Some(source) = self.source() else {
            return Ok(false);
        };

        let modified = std::fs::metadata(&source.path)
            .and_then(|m| m.modified())
            .ok();
        if modified.is_some() && modified == source.modified {
            return Ok(false);
        }

        self.reload(&source.path)?;
        Ok(true)
    }

    /// Drops the active hierarchy.
    pub fn clear(&self) {
        *self.active.write().unwrap_or_else(PoisonError::into_inner) = None;
    }

    fn source(&self) -> Option<Source> {
        self.active
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .and_then(|active| active.source.clone())
    }

    fn install(&self, hierarchy: Arc<PartsHierarchy>, source: Option<Source>) {
        *self.active.write().unwrap_or_else(PoisonError::into_inner) =
            Some(Active { hierarchy, source });
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // LOOKUPS ON THE ACTIVE SNAPSHOT
    // ═══════════════════════════════════════════════════════════════════════════

    /// See [`PartsHierarchy::children_of`]. Empty when nothing is loaded.
    pub fn children_of(&self, parent: &str) -> Vec<PartId> {
        self.snapshot()
            .map(|h| h.children_of(parent).to_vec())
            .unwrap_or_default()
    }

    /// See [`PartsHierarchy::attach_points_of`]. Empty when nothing is loaded.
    pub fn attach_points_of(&self, parent: &str) -> Vec<AttachPoint> {
        self.snapshot()
            .map(|h| h.attach_points_of(parent).to_vec())
            .unwrap_or_default()
    }

    /// See [`PartsHierarchy::is_valid_child`]. False when nothing is loaded.
    pub fn is_valid_child(&self, parent: &str, child: &str) -> bool {
        self.snapshot()
            .is_some_and(|h| h.is_valid_child(parent, child))
    }
}
