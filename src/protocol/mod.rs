//! Protocol Module
//!
//! Defines the wire protocol between the client and the storage service.
//!
//! ## Frame Format
//! ```text
//! ┌──────────┬──────────┬──────────┬─────────────────────────────┐
//! │ Tag (1)  │ Len (4)  │ CRC (4)  │         Payload             │
//! └──────────┴──────────┴──────────┴─────────────────────────────┘
//! ```
//!
//! ### Request Opcodes
//! - 0x01: CREATE_TABLE - Payload: name
//! - 0x02: OPEN_TABLE   - Payload: name
//! - 0x03: DROP_TABLE   - Payload: name
//! - 0x04: PING         - Payload: locator + nonce + timeout_ns
//! - 0x05: READ         - Payload: table + key + reject rules + max_len
//! - 0x06: WRITE        - Payload: table + key + reject rules + value
//! - 0x07: INSERT       - Payload: table + value
//! - 0x08: REMOVE       - Payload: table + key + reject rules
//!
//! ### Response (tag 0x80)
//! Payload: status (4) + version (8) + operation-specific body
//!
//! Every conditional request carries a fixed 12-byte [`RejectRules`]
//! predicate; the service refuses the operation if any set rule holds and
//! reports the outcome through the status field.

mod codec;
mod reject;
mod request;
mod response;

pub use codec::{
    decode_request, decode_response, encode_request, encode_response, read_request,
    read_response, write_request, write_response, HEADER_SIZE, MAX_PAYLOAD_SIZE, RESPONSE_TAG,
};
pub use reject::{Condition, RejectRules};
pub use request::{Opcode, Request};
pub use response::{status_code, Response};
