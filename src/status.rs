//! Status Mapper
//!
//! Translates a numeric service status (plus, for version conflicts, the
//! version the service observed) into a typed result. The mapping is total:
//! every status the service can return lands in exactly one variant, and
//! unrecognized non-zero codes are preserved verbatim instead of being
//! dropped.

use crate::error::{Result, StrataError};
use crate::protocol::status_code;

/// Interpret a service status code.
///
/// `requested_version` is the `given_version` the caller supplied in its
/// reject rules; `observed_version` is the current version the service
/// reported alongside a version rejection. Both are only meaningful for
/// `WRONG_VERSION`.
pub fn interpret(status: u32, requested_version: u64, observed_version: u64) -> Result<()> {
    match status {
        status_code::OK => Ok(()),
        status_code::OBJECT_DOESNT_EXIST => Err(StrataError::ObjectDoesNotExist),
        status_code::OBJECT_EXISTS => Err(StrataError::ObjectAlreadyExists),
        status_code::WRONG_VERSION => Err(StrataError::VersionConflict {
            requested: requested_version,
            observed: observed_version,
        }),
        status_code::VALUE_TOO_LARGE => Err(StrataError::ValueTooLarge),
        other => Err(StrataError::Service(other)),
    }
}
