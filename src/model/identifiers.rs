//! Core identifier newtypes with smart constructors.
//!
//! Identifiers validate non-empty strings at construction time.
//! Raw constructors are never exported - use smart constructors only.

use std::fmt;

/// Stable unique identifier of a feed item.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemId(String);

impl ItemId {
    /// Smart constructor: validates non-empty item id.
    pub fn new(raw: impl Into<String>) -> Result<Self, InvalidItemId> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            return Err(InvalidItemId::Empty);
        }
        Ok(Self(raw))
    }

    /// Borrow the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Location of an item's media (URI or filesystem path).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MediaLocator(String);

impl MediaLocator {
    /// Smart constructor: validates non-empty locator.
    pub fn new(raw: impl Into<String>) -> Result<Self, InvalidMediaLocator> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            return Err(InvalidMediaLocator::Empty);
        }
        Ok(Self(raw))
    }

    /// Borrow the locator as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MediaLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ===== Error Types =====

/// Rejected [`ItemId`] input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidItemId {
    /// Empty or whitespace-only id.
    #[error("Item ID cannot be empty")]
    Empty,
}

/// Rejected [`MediaLocator`] input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidMediaLocator {
    /// Empty or whitespace-only locator.
    #[error("Media locator cannot be empty")]
    Empty,
}

// ===== Tests =====
