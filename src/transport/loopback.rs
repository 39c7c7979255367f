//! Loopback Transport
//!
//! An in-process reference implementation of the storage service contract:
//! the table directory, per-object versioning, and the full reject-rule
//! evaluation semantics. It exists so the conditional-operation protocol can
//! be exercised end to end without a cluster; it makes no durability claims.
//!
//! [`LoopbackTransport`] round-trips every request and response through the
//! wire codec, so each call also validates the framing.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::error::{Result, StrataError};
use crate::protocol::{
    decode_request, decode_response, encode_request, encode_response, status_code, RejectRules,
    Request, Response,
};

use super::Transport;

// =============================================================================
// Service State
// =============================================================================

/// A stored object: value plus current version
struct StoredObject {
    value: Vec<u8>,
    version: u64,
}

/// One table's objects and version bookkeeping
#[derive(Default)]
struct TableState {
    objects: HashMap<u64, StoredObject>,

    /// Highest version ever assigned per key. Survives deletion so versions
    /// are never reused across delete/recreate.
    version_floor: HashMap<u64, u64>,

    /// Next candidate for a service-assigned key
    next_key: u64,
}

impl TableState {
    /// Assign the next version for a key, respecting the floor
    fn next_version(&mut self, key: u64) -> u64 {
        let floor = self.version_floor.get(&key).copied().unwrap_or(0);
        let current = self.objects.get(&key).map(|o| o.version).unwrap_or(0);
        let next = floor.max(current) + 1;
        self.version_floor.insert(key, next);
        next
    }
}

/// Shared service state behind a lock
#[derive(Default)]
struct State {
    tables_by_name: HashMap<String, u32>,
    tables: HashMap<u32, TableState>,
    next_handle: u32,
}

// =============================================================================
// Loopback Service
// =============================================================================

/// In-process reference storage service.
///
/// Cheaply cloneable; clones share state, so several clients can race
/// against the same tables.
#[derive(Clone, Default)]
pub struct LoopbackService {
    state: Arc<RwLock<State>>,
}

impl LoopbackService {
    /// Create an empty service
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle one request and produce its response
    pub fn handle(&self, request: &Request) -> Response {
        match request {
            Request::CreateTable { name } => self.create_table(name),
            Request::OpenTable { name } => self.open_table(name),
            Request::DropTable { name } => self.drop_table(name),
            Request::Ping { nonce, .. } => Response::ok(0, nonce.to_be_bytes().to_vec()),
            Request::Read {
                table,
                key,
                rules,
                max_len,
            } => self.read(*table, *key, rules, *max_len),
            Request::Write {
                table,
                key,
                rules,
                value,
            } => self.write(*table, *key, rules, value),
            Request::Insert { table, value } => self.insert(*table, value),
            Request::Remove { table, key, rules } => self.remove(*table, *key, rules),
        }
    }

    // =========================================================================
    // Table Directory
    // =========================================================================

    fn create_table(&self, name: &str) -> Response {
        let mut state = self.state.write();
        if state.tables_by_name.contains_key(name) {
            return Response::failed(status_code::TABLE_EXISTS);
        }

        state.next_handle += 1;
        let handle = state.next_handle;
        state.tables_by_name.insert(name.to_string(), handle);
        state.tables.insert(handle, TableState::default());
        Response::ok(0, Vec::new())
    }

    fn open_table(&self, name: &str) -> Response {
        let state = self.state.read();
        match state.tables_by_name.get(name) {
            Some(handle) => Response::ok(0, handle.to_be_bytes().to_vec()),
            None => Response::failed(status_code::TABLE_DOESNT_EXIST),
        }
    }

    fn drop_table(&self, name: &str) -> Response {
        let mut state = self.state.write();
        match state.tables_by_name.remove(name) {
            Some(handle) => {
                state.tables.remove(&handle);
                Response::ok(0, Vec::new())
            }
            None => Response::failed(status_code::TABLE_DOESNT_EXIST),
        }
    }

    // =========================================================================
    // Object Operations
    // =========================================================================

    fn read(&self, table: u32, key: u64, rules: &RejectRules, max_len: u32) -> Response {
        let state = self.state.read();
        let table_state = match state.tables.get(&table) {
            Some(t) => t,
            None => return Response::failed(status_code::TABLE_DOESNT_EXIST),
        };

        let object = table_state.objects.get(&key);
        if let Err(rejection) = check_rules(object, rules) {
            return rejection;
        }

        // Rules without object_doesnt_exist cannot make an absent object
        // readable; there is nothing to return.
        let object = match object {
            Some(o) => o,
            None => return Response::failed(status_code::OBJECT_DOESNT_EXIST),
        };

        if object.value.len() > max_len as usize {
            return Response::failed(status_code::VALUE_TOO_LARGE);
        }

        Response::ok(object.version, object.value.clone())
    }

    fn write(&self, table: u32, key: u64, rules: &RejectRules, value: &[u8]) -> Response {
        let mut state = self.state.write();
        let table_state = match state.tables.get_mut(&table) {
            Some(t) => t,
            None => return Response::failed(status_code::TABLE_DOESNT_EXIST),
        };

        if let Err(rejection) = check_rules(table_state.objects.get(&key), rules) {
            return rejection;
        }

        let version = table_state.next_version(key);
        table_state.objects.insert(
            key,
            StoredObject {
                value: value.to_vec(),
                version,
            },
        );
        Response::ok(version, Vec::new())
    }

    fn insert(&self, table: u32, value: &[u8]) -> Response {
        let mut state = self.state.write();
        let table_state = match state.tables.get_mut(&table) {
            Some(t) => t,
            None => return Response::failed(status_code::TABLE_DOESNT_EXIST),
        };

        // Skip keys that are live or were ever written, so service-assigned
        // keys never collide with caller-chosen ones.
        while table_state.objects.contains_key(&table_state.next_key)
            || table_state.version_floor.contains_key(&table_state.next_key)
        {
            table_state.next_key += 1;
        }
        let key = table_state.next_key;
        table_state.next_key += 1;

        let version = table_state.next_version(key);
        table_state.objects.insert(
            key,
            StoredObject {
                value: value.to_vec(),
                version,
            },
        );
        Response::ok(version, key.to_be_bytes().to_vec())
    }

    fn remove(&self, table: u32, key: u64, rules: &RejectRules) -> Response {
        let mut state = self.state.write();
        let table_state = match state.tables.get_mut(&table) {
            Some(t) => t,
            None => return Response::failed(status_code::TABLE_DOESNT_EXIST),
        };

        if let Err(rejection) = check_rules(table_state.objects.get(&key), rules) {
            return rejection;
        }

        // Blind removal of an absent object is a no-op that reports version 0.
        match table_state.objects.remove(&key) {
            Some(object) => Response::ok(object.version, Vec::new()),
            None => Response::ok(0, Vec::new()),
        }
    }
}

/// Evaluate reject rules against an object's current state.
///
/// Existence rules take precedence: version rules are only meaningful
/// against an existing object, so an absent object can only be rejected as
/// `OBJECT_DOESNT_EXIST`. Version rejections carry the current version.
fn check_rules(
    object: Option<&StoredObject>,
    rules: &RejectRules,
) -> std::result::Result<(), Response> {
    match object {
        None => {
            if rules.object_doesnt_exist {
                return Err(Response::failed(status_code::OBJECT_DOESNT_EXIST));
            }
        }
        Some(object) => {
            if rules.object_exists {
                return Err(Response::failed(status_code::OBJECT_EXISTS));
            }
            if rules.version_eq_given && object.version == rules.given_version {
                return Err(Response::wrong_version(object.version));
            }
            if rules.version_gt_given && object.version > rules.given_version {
                return Err(Response::wrong_version(object.version));
            }
        }
    }
    Ok(())
}

// =============================================================================
// Loopback Transport
// =============================================================================

/// A [`Transport`] bound to an in-process [`LoopbackService`]
pub struct LoopbackTransport {
    service: LoopbackService,
    open: bool,
}

impl LoopbackTransport {
    /// Create a transport session against the given service
    pub fn new(service: LoopbackService) -> Self {
        Self {
            service,
            open: true,
        }
    }
}

impl Transport for LoopbackTransport {
    fn call(&mut self, request: &Request) -> Result<Response> {
        if !self.open {
            return Err(StrataError::Connection(
                "session already released".to_string(),
            ));
        }

        // Full wire round-trip: what the service sees and what the client
        // gets back both pass through the codec.
        let request = decode_request(&encode_request(request)?)?;
        let response = self.service.handle(&request);
        decode_response(&encode_response(&response)?)
    }

    fn close(&mut self) {
        self.open = false;
    }
}
