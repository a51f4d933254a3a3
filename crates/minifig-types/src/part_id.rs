//! LDraw part identifier type.
//!
//! Part identifiers are catalog numbers such as `3626` or `973p01`,
//! optionally carrying a one-character prefix that marks the part as
//! obsolete (`~`) or unofficial (`u`). The prefix is part of the identity:
//! `~3626` and `3626` are different parts.

use std::borrow::Borrow;
use std::fmt;
use std::str::FromStr;

use crate::PartPrefix;

/// Error returned when a token is not a valid part identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartIdError {
    /// The rejected token.
    pub value: String,
}

impl fmt::Display for PartIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid part identifier: {}", self.value)
    }
}

impl std::error::Error for PartIdError {}

/// An LDraw part identifier.
///
/// # Examples
///
/// ```
/// use minifig_types::{PartId, PartPrefix};
///
/// let head: PartId = "3626".parse().unwrap();
/// assert_eq!(head.prefix(), PartPrefix::Official);
///
/// let old: PartId = "~3626".parse().unwrap();
/// assert!(old.is_obsolete());
/// assert_ne!(head, old);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct PartId(String);

impl PartId {
    /// Validates and wraps a part identifier.
    ///
    /// The body after the optional prefix must start with an ASCII digit
    /// and may continue with ASCII letters, digits, `-` or `.`.
    pub fn new(value: impl Into<String>) -> Result<Self, PartIdError> {
        let value = value.into();
        if Self::is_valid(&value) {
            Ok(Self(value))
        } else {
            Err(PartIdError { value })
        }
    }

    /// Returns true if `value` is lexically a part identifier.
    pub fn is_valid(value: &str) -> bool {
        let body = match value.chars().next().and_then(PartPrefix::from_marker) {
            Some(_) => &value[1..],
            None => value,
        };

        let mut chars = body.chars();
        match chars.next() {
            Some(c) if c.is_ascii_digit() => {}
            _ => return false,
        }
        chars.all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '.')
    }

    /// Returns the identifier text, prefix included.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the status encoded by the leading marker.
    pub fn prefix(&self) -> PartPrefix {
        self.0
            .chars()
            .next()
            .and_then(PartPrefix::from_marker)
            .unwrap_or(PartPrefix::Official)
    }

    /// Returns the catalog number without its status marker.
    pub fn catalog_number(&self) -> &str {
        match self.prefix() {
            PartPrefix::Official => &self.0,
            _ => &self.0[1..],
        }
    }

    /// Returns true if this identifier is marked obsolete (`~`).
    pub fn is_obsolete(&self) -> bool {
        self.prefix() == PartPrefix::Obsolete
    }

    /// Returns true if this identifier is marked unofficial (`u`).
    pub fn is_unofficial(&self) -> bool {
        self.prefix() == PartPrefix::Unofficial
    }
}

impl FromStr for PartId {
    type Err = PartIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl fmt::Display for PartId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for PartId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for PartId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for PartId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for PartId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}
