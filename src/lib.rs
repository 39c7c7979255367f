//! # StrataKV Client
//!
//! Client library for the StrataKV table-based key-value storage service:
//! - Named tables holding opaque binary objects keyed by u64
//! - Optimistic concurrency control via per-object version numbers
//! - Conditional operations through reject-rule predicates
//! - Synchronous, blocking request/response over an injectable transport
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        Client                                │
//! │        (tables, create/read/update/write/delete)             │
//! └─────────┬──────────────────────────────────────┬────────────┘
//!           │ build predicate                      │ interpret outcome
//!           ▼                                      ▼
//!   ┌──────────────┐                       ┌──────────────┐
//!   │ RejectRules  │                       │    Status    │
//!   │    Codec     │                       │    Mapper    │
//!   └──────┬───────┘                       └──────▲───────┘
//!          │ request                              │ response
//!          ▼                                      │
//! ┌─────────────────────────────────────────────────────────────┐
//! │                  Transport (blocking)                        │
//! │              TCP  /  in-process loopback                     │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```
//! use stratakv::{Client, Condition, Config};
//! use stratakv::transport::{LoopbackService, LoopbackTransport};
//!
//! # fn main() -> stratakv::Result<()> {
//! let service = LoopbackService::new();
//! let transport = Box::new(LoopbackTransport::new(service));
//! let mut client = Client::with_transport(transport, Config::default());
//!
//! client.create_table("accounts")?;
//! let table = client.open_table("accounts")?;
//!
//! let v1 = client.create(table, 42, b"hello")?;
//! let (value, version) = client.read(table, 42, Condition::RequireExists)?;
//! assert_eq!(value, b"hello");
//! assert_eq!(version, v1);
//!
//! client.update(table, 42, b"bye", Condition::RequireVersion(v1))?;
//! client.disconnect();
//! # Ok(())
//! # }
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod protocol;
pub mod status;
pub mod transport;
pub mod client;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use client::{Client, RequestHook, TableHandle};
pub use config::Config;
pub use error::{Result, StrataError};
pub use protocol::{Condition, RejectRules};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of the StrataKV client
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
