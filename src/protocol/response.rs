//! Response definitions
//!
//! Represents responses from the storage service.

/// Status codes returned by the service.
///
/// The client maps these to typed errors in [`crate::status`]; codes it does
/// not recognize are preserved verbatim as service errors.
pub mod status_code {
    /// Operation applied
    pub const OK: u32 = 0;

    /// The named table is unknown
    pub const TABLE_DOESNT_EXIST: u32 = 1;

    /// A reject rule fired against an absent object
    pub const OBJECT_DOESNT_EXIST: u32 = 2;

    /// A reject rule fired against a present object
    pub const OBJECT_EXISTS: u32 = 3;

    /// A version rule fired; the response carries the current version
    pub const WRONG_VERSION: u32 = 4;

    /// The object does not fit the offered read buffer
    pub const VALUE_TOO_LARGE: u32 = 5;

    /// The named table already exists
    pub const TABLE_EXISTS: u32 = 6;
}

/// A response from the storage service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// Status code (see [`status_code`])
    pub status: u32,

    /// On success: the new (or read) object version.
    /// On `WRONG_VERSION`: the version the service observed as current.
    pub version: u64,

    /// Operation-specific body: read value bytes, open_table handle,
    /// ping nonce, insert key. Empty otherwise.
    pub body: Vec<u8>,
}

impl Response {
    /// Create a success response with a version and body
    pub fn ok(version: u64, body: Vec<u8>) -> Self {
        Self {
            status: status_code::OK,
            version,
            body,
        }
    }

    /// Create a failure response
    pub fn failed(status: u32) -> Self {
        Self {
            status,
            version: 0,
            body: Vec::new(),
        }
    }

    /// Create a version-rule rejection carrying the observed version
    pub fn wrong_version(observed: u64) -> Self {
        Self {
            status: status_code::WRONG_VERSION,
            version: observed,
            body: Vec::new(),
        }
    }
}
