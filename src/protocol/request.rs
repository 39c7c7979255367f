//! Request definitions
//!
//! Represents requests issued by the client to the storage service.

use super::RejectRules;

/// Request opcodes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Opcode {
    CreateTable = 0x01,
    OpenTable = 0x02,
    DropTable = 0x03,
    Ping = 0x04,
    Read = 0x05,
    Write = 0x06,
    Insert = 0x07,
    Remove = 0x08,
}

/// A request to the storage service
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    /// Create a named table
    CreateTable { name: String },

    /// Resolve a table name to its numeric handle
    OpenTable { name: String },

    /// Remove a table and all objects in it
    DropTable { name: String },

    /// Liveness probe against a service locator
    Ping {
        locator: String,
        nonce: u64,
        timeout_ns: u64,
    },

    /// Read an object, bounded by the offered buffer size
    Read {
        table: u32,
        key: u64,
        rules: RejectRules,
        max_len: u32,
    },

    /// Write an object under the given reject rules
    Write {
        table: u32,
        key: u64,
        rules: RejectRules,
        value: Vec<u8>,
    },

    /// Write an object under a service-assigned key
    Insert { table: u32, value: Vec<u8> },

    /// Remove an object under the given reject rules
    Remove {
        table: u32,
        key: u64,
        rules: RejectRules,
    },
}

impl Request {
    /// Get the request opcode
    pub fn opcode(&self) -> Opcode {
        match self {
            Request::CreateTable { .. } => Opcode::CreateTable,
            Request::OpenTable { .. } => Opcode::OpenTable,
            Request::DropTable { .. } => Opcode::DropTable,
            Request::Ping { .. } => Opcode::Ping,
            Request::Read { .. } => Opcode::Read,
            Request::Write { .. } => Opcode::Write,
            Request::Insert { .. } => Opcode::Insert,
            Request::Remove { .. } => Opcode::Remove,
        }
    }
}
