//! Open-time collision resolution.
//!
//! Policy:
//! - NormalOpen: create-or-open.
//! - FailIfExists: refuse when the target exists.
//! - OverwriteIfExists: truncate an existing target, otherwise create.
//! - RenameIfExists: pick a fresh sibling name when the target exists.
//!
//! The `can_open` guard runs first and short-circuits to a rejection, so an
//! existing target under FailIfExists is refused even for a read-only open.
//! Past the guard, read-only opens always read the existing file.

use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AccessMode {
    #[default]
    ReadWrite,
    ReadOnly,
    /// Read-write; the file is removed when the stream closes.
    ReadWriteTemporary,
    /// Read-write; no other opener may hold the file concurrently.
    ReadWriteExclusive,
}

impl AccessMode {
    pub const ALL: [AccessMode; 4] = [
        AccessMode::ReadWrite,
        AccessMode::ReadOnly,
        AccessMode::ReadWriteTemporary,
        AccessMode::ReadWriteExclusive,
    ];

    pub fn is_writable(self) -> bool {
        !matches!(self, AccessMode::ReadOnly)
    }

    /// Parse common names (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "rw" | "readwrite" | "read-write" => Some(AccessMode::ReadWrite),
            "ro" | "read" | "readonly" | "read-only" => Some(AccessMode::ReadOnly),
            "temp" | "temporary" => Some(AccessMode::ReadWriteTemporary),
            "exclusive" | "excl" => Some(AccessMode::ReadWriteExclusive),
            _ => None,
        }
    }
}

impl fmt::Display for AccessMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AccessMode::ReadWrite => "rw",
            AccessMode::ReadOnly => "ro",
            AccessMode::ReadWriteTemporary => "temp",
            AccessMode::ReadWriteExclusive => "exclusive",
        };
        f.write_str(s)
    }
}

impl FromStr for AccessMode {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("invalid access mode: '{s}'"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CollisionMethod {
    #[default]
    NormalOpen,
    FailIfExists,
    OverwriteIfExists,
    RenameIfExists,
}

impl CollisionMethod {
    pub const ALL: [CollisionMethod; 4] = [
        CollisionMethod::NormalOpen,
        CollisionMethod::FailIfExists,
        CollisionMethod::OverwriteIfExists,
        CollisionMethod::RenameIfExists,
    ];

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "normal" | "open" | "normalopen" => Some(CollisionMethod::NormalOpen),
            "fail" | "failifexists" => Some(CollisionMethod::FailIfExists),
            "overwrite" | "overwriteifexists" => Some(CollisionMethod::OverwriteIfExists),
            "rename" | "renameifexists" => Some(CollisionMethod::RenameIfExists),
            _ => None,
        }
    }
}

impl fmt::Display for CollisionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CollisionMethod::NormalOpen => "normal",
            CollisionMethod::FailIfExists => "fail",
            CollisionMethod::OverwriteIfExists => "overwrite",
            CollisionMethod::RenameIfExists => "rename",
        };
        f.write_str(s)
    }
}

impl FromStr for CollisionMethod {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("invalid collision method: '{s}'"))
    }
}

/// Concrete open behavior once mode, policy and disk state are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenAction {
    /// Open an existing file for reading.
    Read,
    /// Open if present, create if not; contents kept.
    OpenOrCreate,
    /// Create, truncating an existing file.
    Truncate,
    /// Create a file that must not exist yet.
    CreateNew,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Proceed(OpenAction),
    /// Pick a new sibling name, then create it.
    Rename,
    Reject,
}

/// Guard evaluated before the decision table.
pub fn can_open(mode: AccessMode, method: CollisionMethod, exists: bool) -> bool {
    !((method == CollisionMethod::FailIfExists && exists)
        || (mode == AccessMode::ReadOnly && !exists))
}

/// Decide what an open request does given the current existence of its target.
pub fn resolve(mode: AccessMode, method: CollisionMethod, exists: bool) -> Resolution {
    if !can_open(mode, method, exists) {
        return Resolution::Reject;
    }
    if mode == AccessMode::ReadOnly {
        return Resolution::Proceed(OpenAction::Read);
    }
    let action = match (method, exists) {
        (CollisionMethod::NormalOpen, _) => OpenAction::OpenOrCreate,
        (CollisionMethod::OverwriteIfExists, true) => OpenAction::Truncate,
        (CollisionMethod::RenameIfExists, true) => return Resolution::Rename,
        // Nothing there yet: every remaining policy creates at the requested path.
        (_, false) => OpenAction::CreateNew,
        (CollisionMethod::FailIfExists, true) => return Resolution::Reject,
    };
    Resolution::Proceed(action)
}
