//! Well-known minifigure part numbers.
//!
//! This module provides constants for the catalog numbers that anchor the
//! standard minifigure hierarchy: torso, head, hips, legs, arms and hands.
//!
//! # Examples
//!
//! ```
//! use minifig_types::well_known;
//!
//! assert_eq!(well_known::TORSO, "973");
//! assert!(well_known::is_minifig_body_part("3626"));
//! ```

// =============================================================================
// Body
// =============================================================================

/// Minifig torso (973).
///
/// Root of the hierarchy: head, arms and hips attach to it.
pub const TORSO: &str = "973";

/// Minifig head (3626).
///
/// Hair, hats, helmets and caps attach to it.
pub const HEAD: &str = "3626";

/// Minifig hips (970).
pub const HIPS: &str = "970";

/// Minifig left leg (971).
pub const LEG_LEFT: &str = "971";

/// Minifig right leg (972).
pub const LEG_RIGHT: &str = "972";

// =============================================================================
// Arms and hands
// =============================================================================

/// Minifig right arm (975).
pub const ARM_RIGHT: &str = "975";

/// Minifig left arm (976).
pub const ARM_LEFT: &str = "976";

/// Minifig hand (977).
pub const HAND: &str = "977";

/// All body part numbers above, torso first.
pub const BODY_PARTS: &[&str] = &[
    TORSO, HEAD, HIPS, LEG_LEFT, LEG_RIGHT, ARM_RIGHT, ARM_LEFT, HAND,
];

/// Returns true if `id` is one of the standard minifigure body parts.
pub fn is_minifig_body_part(id: &str) -> bool {
    BODY_PARTS.contains(&id)
}
