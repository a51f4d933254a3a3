//! Enumeration types for part identifier status.

/// Catalog status of a part, encoded as a one-character identifier prefix.
///
/// # Examples
///
/// ```
/// use minifig_types::PartPrefix;
///
/// assert_eq!(PartPrefix::from_marker('~'), Some(PartPrefix::Obsolete));
/// assert_eq!(PartPrefix::Unofficial.marker(), Some('u'));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PartPrefix {
    /// Regular catalog number, no marker.
    #[default]
    Official,
    /// Deprecated catalog number kept for compatibility (`~`).
    Obsolete,
    /// Community-contributed, non-official number (`u`).
    Unofficial,
}

impl PartPrefix {
    /// Marker character for obsolete parts.
    pub const OBSOLETE_MARKER: char = '~';
    /// Marker character for unofficial parts.
    pub const UNOFFICIAL_MARKER: char = 'u';

    /// Creates a PartPrefix from its marker character.
    ///
    /// Returns `None` if the character is not a status marker.
    pub fn from_marker(c: char) -> Option<Self> {
        match c {
            Self::OBSOLETE_MARKER => Some(Self::Obsolete),
            Self::UNOFFICIAL_MARKER => Some(Self::Unofficial),
            _ => None,
        }
    }

    /// Returns the marker character, or `None` for official parts.
    pub fn marker(self) -> Option<char> {
        match self {
            Self::Official => None,
            Self::Obsolete => Some(Self::OBSOLETE_MARKER),
            Self::Unofficial => Some(Self::UNOFFICIAL_MARKER),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_part_prefix_roundtrip() {
        for prefix in [PartPrefix::Obsolete, PartPrefix::Unofficial] {
            let marker = prefix.marker().unwrap();
            assert_eq!(PartPrefix::from_marker(marker), Some(prefix));
        }
        assert_eq!(PartPrefix::Official.marker(), None);
    }

    #[test]
    fn test_digits_are_not_markers() {
        assert_eq!(PartPrefix::from_marker('3'), None);
        assert_eq!(PartPrefix::from_marker('U'), None);
    }
}
