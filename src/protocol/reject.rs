//! Reject rules
//!
//! The conditional-operation predicate sent with every object request. The
//! service evaluates the set rules against the object's current
//! existence/version and refuses the operation if any set rule's condition
//! holds. A refused operation never has a partial effect.

use bytes::{Buf, BufMut};

use crate::error::{Result, StrataError};

/// A conditional-operation predicate.
///
/// All rules default to unset. Setting several rules rejects the operation
/// as soon as any one of them holds.
///
/// Field order matters: the derived ordering is lexicographic over
/// (object_doesnt_exist, object_exists, version_eq_given, version_gt_given,
/// given_version), which keeps test assertions deterministic. The wire
/// layout differs (given_version first, see [`RejectRules::encode_into`]).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RejectRules {
    /// Reject if the object is currently absent
    pub object_doesnt_exist: bool,

    /// Reject if the object is currently present
    pub object_exists: bool,

    /// Reject if the current version equals `given_version`
    pub version_eq_given: bool,

    /// Reject if the current version is greater than `given_version`
    pub version_gt_given: bool,

    /// Version operand for the two version rules
    pub given_version: u64,
}

impl RejectRules {
    /// Wire size: given_version (8) + four rule flags (1 each)
    pub const ENCODED_LEN: usize = 12;

    /// No predicate: the operation is unconditional.
    pub fn none() -> Self {
        Self::default()
    }

    /// Reject unless the object currently exists.
    pub fn must_exist() -> Self {
        Self {
            object_doesnt_exist: true,
            ..Self::default()
        }
    }

    /// Reject if the object already exists.
    pub fn must_not_exist() -> Self {
        Self {
            object_exists: true,
            ..Self::default()
        }
    }

    /// Operate only if the object exists at precisely `want_version`.
    ///
    /// Equality is implied rather than checked: versions are monotonic, so
    /// an existing object whose version is not greater than `want_version`
    /// can only be at exactly `want_version`.
    pub fn exactly(want_version: u64) -> Self {
        Self {
            object_doesnt_exist: true,
            version_gt_given: true,
            given_version: want_version,
            ..Self::default()
        }
    }

    /// Reject only if the current version is greater than `want_version`.
    ///
    /// Existence is not required, which makes this the guard for
    /// overwrite-or-create writes.
    pub fn unless_newer_than(want_version: u64) -> Self {
        Self {
            version_gt_given: true,
            given_version: want_version,
            ..Self::default()
        }
    }

    /// Return a copy with `object_doesnt_exist` forced on.
    ///
    /// The read path applies this to every predicate, caller-supplied ones
    /// included, so a read of an absent object always fails rather than
    /// returning an arbitrary value.
    pub fn requiring_existence(mut self) -> Self {
        self.object_doesnt_exist = true;
        self
    }

    // =========================================================================
    // Wire Encoding
    // =========================================================================

    /// Append the fixed 12-byte wire encoding.
    ///
    /// Layout: given_version as u64 BE, then the four rule flags in field
    /// order as 0x00/0x01 bytes.
    pub fn encode_into(&self, buf: &mut Vec<u8>) {
        buf.put_u64(self.given_version);
        buf.put_u8(self.object_doesnt_exist as u8);
        buf.put_u8(self.object_exists as u8);
        buf.put_u8(self.version_eq_given as u8);
        buf.put_u8(self.version_gt_given as u8);
    }

    /// Decode the fixed 12-byte wire encoding, consuming it from `buf`.
    pub fn decode(buf: &mut &[u8]) -> Result<Self> {
        if buf.remaining() < Self::ENCODED_LEN {
            return Err(StrataError::Protocol(format!(
                "truncated reject rules: expected {} bytes, got {}",
                Self::ENCODED_LEN,
                buf.remaining()
            )));
        }

        let given_version = buf.get_u64();
        let mut flag = |name: &str| -> Result<bool> {
            match buf.get_u8() {
                0 => Ok(false),
                1 => Ok(true),
                other => Err(StrataError::Protocol(format!(
                    "invalid {} flag: 0x{:02x}",
                    name, other
                ))),
            }
        };

        Ok(Self {
            object_doesnt_exist: flag("object_doesnt_exist")?,
            object_exists: flag("object_exists")?,
            version_eq_given: flag("version_eq_given")?,
            version_gt_given: flag("version_gt_given")?,
            given_version,
        })
    }
}

// =============================================================================
// Operation Modes
// =============================================================================

/// How an operation conditions on the object's current state.
///
/// Callers state their intent explicitly instead of relying on an optional
/// version parameter; a pure resolution step turns the mode into
/// [`RejectRules`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Condition {
    /// No predicate.
    Unconditional,

    /// The object must currently exist.
    RequireExists,

    /// The object must exist at exactly this version.
    RequireVersion(u64),
}

impl Condition {
    /// Resolve to reject rules for read/update/delete.
    ///
    /// `RequireVersion` maps to [`RejectRules::exactly`], which also demands
    /// existence.
    pub fn to_reject_rules(self) -> RejectRules {
        match self {
            Condition::Unconditional => RejectRules::none(),
            Condition::RequireExists => RejectRules::must_exist(),
            Condition::RequireVersion(v) => RejectRules::exactly(v),
        }
    }

    /// Resolve to reject rules for overwrite-or-create writes.
    ///
    /// `RequireVersion` only fences off concurrent newer writes; it does not
    /// demand prior existence.
    pub fn to_overwrite_rules(self) -> RejectRules {
        match self {
            Condition::Unconditional => RejectRules::none(),
            Condition::RequireExists => RejectRules::must_exist(),
            Condition::RequireVersion(v) => RejectRules::unless_newer_than(v),
        }
    }
}
