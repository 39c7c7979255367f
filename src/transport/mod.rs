//! Transport Module
//!
//! The synchronous request/response boundary to the storage service. The
//! core never performs cluster discovery or locator parsing itself; it
//! issues [`Request`]s through an injected [`Transport`] and interprets the
//! [`Response`]s that come back.

mod loopback;
mod tcp;

pub use loopback::{LoopbackService, LoopbackTransport};
pub use tcp::TcpTransport;

use crate::error::Result;
use crate::protocol::{Request, Response};

/// A blocking session with the storage service.
///
/// One request is in flight at a time; `call` blocks the calling thread
/// until the service responds or the transport fails.
pub trait Transport: Send {
    /// Issue one request and wait for its response.
    fn call(&mut self, request: &Request) -> Result<Response>;

    /// Release the underlying session. Safe to call more than once.
    fn close(&mut self);
}
