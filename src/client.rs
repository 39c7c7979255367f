//! Client
//!
//! The session with a storage cluster. All table and object operations are
//! issued through a [`Client`]; each call blocks until the service responds.
//!
//! ## Lifecycle
//!
//! A `Client` only exists in the connected state: [`Client::connect`] either
//! yields a usable session or fails. [`Client::disconnect`] consumes the
//! client, making further operations unrepresentable, and dropping a client
//! releases the session, so it is never leaked on error paths.
//!
//! ## Concurrency
//!
//! One request is in flight per client at a time; a client is not meant to
//! be shared across threads. Table handles, [`Condition`]s and
//! [`RejectRules`] are `Copy` and freely shareable.

use bytes::Buf;

use crate::config::Config;
use crate::error::{Result, StrataError};
use crate::protocol::{Condition, RejectRules, Request, Response};
use crate::status;
use crate::transport::{TcpTransport, Transport};

// =============================================================================
// Table Handles
// =============================================================================

/// A numeric handle naming an open table.
///
/// Only meaningful to the session that returned it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TableHandle(u32);

impl TableHandle {
    /// The raw service-side identifier
    pub fn id(self) -> u32 {
        self.0
    }
}

// =============================================================================
// Request Hook
// =============================================================================

/// Strategy invoked immediately before each object-operation request is
/// issued. The default does nothing; test harnesses inject one to add
/// faults or delay at the last moment before the wire.
pub trait RequestHook: Send {
    fn before_request(&mut self);
}

/// The production hook: a no-op
struct NoopHook;

impl RequestHook for NoopHook {
    fn before_request(&mut self) {}
}

// =============================================================================
// Client
// =============================================================================

/// A connected session with a storage cluster
pub struct Client {
    transport: Box<dyn Transport>,
    config: Config,
    hook: Box<dyn RequestHook>,

    /// Cleared by an explicit disconnect so Drop skips the release
    open: bool,
}

impl Client {
    // =========================================================================
    // Session Lifecycle
    // =========================================================================

    /// Connect to the cluster named by the locator, with default config
    pub fn connect(locator: &str) -> Result<Self> {
        Self::connect_with_config(Config::builder().locator(locator).build())
    }

    /// Connect to the cluster named by `config.locator`
    pub fn connect_with_config(config: Config) -> Result<Self> {
        let transport = TcpTransport::connect(&config.locator, &config)?;
        tracing::debug!("connected to {}", config.locator);
        Ok(Self::with_transport(Box::new(transport), config))
    }

    /// Build a client over an already-established transport session.
    ///
    /// This is the injection seam: tests hand in a loopback transport, other
    /// callers any [`Transport`] implementation.
    pub fn with_transport(transport: Box<dyn Transport>, config: Config) -> Self {
        Self {
            transport,
            config,
            hook: Box::new(NoopHook),
            open: true,
        }
    }

    /// Release the session.
    ///
    /// Consumes the client; the session cannot be used again. Dropping the
    /// client without calling this releases the session as well.
    pub fn disconnect(mut self) {
        self.transport.close();
        self.open = false;
        tracing::debug!("session disconnected");
    }

    /// Liveness probe using the configured default timeout
    pub fn ping(&mut self, locator: &str, nonce: u64) -> Result<u64> {
        let timeout = self.config.ping_timeout;
        self.ping_with_timeout(locator, nonce, timeout)
    }

    /// Liveness probe against a service locator.
    ///
    /// Returns the remote's echoed nonce, or a timeout-class transport
    /// fault. No effect beyond network traffic.
    pub fn ping_with_timeout(
        &mut self,
        locator: &str,
        nonce: u64,
        timeout: std::time::Duration,
    ) -> Result<u64> {
        let response = self.transport.call(&Request::Ping {
            locator: locator.to_string(),
            nonce,
            timeout_ns: timeout.as_nanos() as u64,
        })?;
        status::interpret(response.status, 0, response.version)?;
        parse_u64_body(&response, "ping")
    }

    /// Replace the pre-request hook (intended for test harnesses)
    pub fn set_request_hook(&mut self, hook: Box<dyn RequestHook>) {
        self.hook = hook;
    }

    /// The configuration this session was built with
    pub fn config(&self) -> &Config {
        &self.config
    }

    // =========================================================================
    // Table Directory
    // =========================================================================

    /// Create a named table.
    ///
    /// Not idempotent: creating an existing table is a service error.
    pub fn create_table(&mut self, name: &str) -> Result<()> {
        tracing::trace!(table = name, "create_table");
        let response = self.transport.call(&Request::CreateTable {
            name: name.to_string(),
        })?;
        status::interpret(response.status, 0, 0)
    }

    /// Resolve an existing table name to its handle
    pub fn open_table(&mut self, name: &str) -> Result<TableHandle> {
        tracing::trace!(table = name, "open_table");
        let response = self.transport.call(&Request::OpenTable {
            name: name.to_string(),
        })?;
        status::interpret(response.status, 0, 0)?;

        let mut body = response.body.as_slice();
        if body.remaining() < 4 {
            return Err(StrataError::Protocol(
                "open_table response missing handle".to_string(),
            ));
        }
        Ok(TableHandle(body.get_u32()))
    }

    /// Remove a table and every object in it
    pub fn drop_table(&mut self, name: &str) -> Result<()> {
        tracing::trace!(table = name, "drop_table");
        let response = self.transport.call(&Request::DropTable {
            name: name.to_string(),
        })?;
        status::interpret(response.status, 0, 0)
    }

    // =========================================================================
    // Object Operations
    // =========================================================================

    /// Create an object. Rejected with `ObjectAlreadyExists` if the key is
    /// already live; the existing object is left untouched.
    pub fn create(&mut self, table: TableHandle, key: u64, value: &[u8]) -> Result<u64> {
        self.write_with_rules(table, key, value, RejectRules::must_not_exist())
    }

    /// Read an object's value and version.
    ///
    /// Whatever the condition resolves to, the read path additionally forces
    /// `object_doesnt_exist`, so reading an absent object always fails as
    /// `ObjectDoesNotExist` instead of yielding an arbitrary value.
    pub fn read(&mut self, table: TableHandle, key: u64, cond: Condition) -> Result<(Vec<u8>, u64)> {
        self.read_with_rules(table, key, cond.to_reject_rules())
    }

    /// Overwrite an existing object.
    ///
    /// Predicate construction matches [`Client::read`]: existence is always
    /// required, and `RequireVersion(v)` additionally demands the current
    /// version be exactly `v`.
    pub fn update(
        &mut self,
        table: TableHandle,
        key: u64,
        value: &[u8],
        cond: Condition,
    ) -> Result<u64> {
        let rules = cond.to_reject_rules().requiring_existence();
        self.write_with_rules(table, key, value, rules)
    }

    /// Overwrite-or-create an object.
    ///
    /// Unconditional by default (blind write); `RequireVersion(v)` rejects
    /// only if the current version is greater than `v`, without demanding
    /// prior existence.
    pub fn write(
        &mut self,
        table: TableHandle,
        key: u64,
        value: &[u8],
        cond: Condition,
    ) -> Result<u64> {
        self.write_with_rules(table, key, value, cond.to_overwrite_rules())
    }

    /// Write an object under a service-assigned key.
    ///
    /// Returns the chosen key and the object's version.
    pub fn insert(&mut self, table: TableHandle, value: &[u8]) -> Result<(u64, u64)> {
        tracing::trace!(table = table.id(), "insert");
        self.hook.before_request();
        let response = self.transport.call(&Request::Insert {
            table: table.id(),
            value: value.to_vec(),
        })?;
        status::interpret(response.status, 0, response.version)?;
        let key = parse_u64_body(&response, "insert")?;
        Ok((key, response.version))
    }

    /// Delete an object, returning the removed object's version.
    ///
    /// Predicate construction matches [`Client::read`]: deleting an absent
    /// object fails as `ObjectDoesNotExist` unless raw rules say otherwise.
    pub fn delete(&mut self, table: TableHandle, key: u64, cond: Condition) -> Result<u64> {
        let rules = cond.to_reject_rules().requiring_existence();
        self.remove_with_rules(table, key, rules)
    }

    // =========================================================================
    // Raw Conditional Operations
    // =========================================================================

    /// Read under caller-supplied reject rules.
    ///
    /// `object_doesnt_exist` is forced on even here, overriding the caller's
    /// rules: a read can never succeed against an absent object.
    pub fn read_with_rules(
        &mut self,
        table: TableHandle,
        key: u64,
        rules: RejectRules,
    ) -> Result<(Vec<u8>, u64)> {
        let rules = rules.requiring_existence();
        tracing::trace!(table = table.id(), key, "read");
        self.hook.before_request();
        let response = self.transport.call(&Request::Read {
            table: table.id(),
            key,
            rules,
            max_len: self.config.max_read_len,
        })?;
        status::interpret(response.status, rules.given_version, response.version)?;
        Ok((response.body, response.version))
    }

    /// Write under caller-supplied reject rules, passed through verbatim
    pub fn write_with_rules(
        &mut self,
        table: TableHandle,
        key: u64,
        value: &[u8],
        rules: RejectRules,
    ) -> Result<u64> {
        tracing::trace!(table = table.id(), key, len = value.len(), "write");
        self.hook.before_request();
        let response = self.transport.call(&Request::Write {
            table: table.id(),
            key,
            rules,
            value: value.to_vec(),
        })?;
        status::interpret(response.status, rules.given_version, response.version)?;
        Ok(response.version)
    }

    /// Remove under caller-supplied reject rules, passed through verbatim
    pub fn remove_with_rules(
        &mut self,
        table: TableHandle,
        key: u64,
        rules: RejectRules,
    ) -> Result<u64> {
        tracing::trace!(table = table.id(), key, "remove");
        self.hook.before_request();
        let response = self.transport.call(&Request::Remove {
            table: table.id(),
            key,
            rules,
        })?;
        status::interpret(response.status, rules.given_version, response.version)?;
        Ok(response.version)
    }
}

impl Drop for Client {
    fn drop(&mut self) {
        // Guaranteed release: an explicit disconnect already cleared `open`.
        if self.open {
            self.transport.close();
            tracing::debug!("session released on drop");
        }
    }
}

/// Extract a u64 body field (ping nonce, insert key)
fn parse_u64_body(response: &Response, what: &str) -> Result<u64> {
    let mut body = response.body.as_slice();
    if body.remaining() < 8 {
        return Err(StrataError::Protocol(format!(
            "{} response body too short: {} bytes",
            what,
            response.body.len()
        )));
    }
    Ok(body.get_u64())
}
