//! TCP Transport
//!
//! Speaks the framed wire protocol over a TCP stream. Locator strings of the
//! form `tcp:host=<host>,port=<port>` are interpreted here; the rest of the
//! crate treats locators as opaque.

use std::io::{BufReader, BufWriter, Write};
use std::net::{Shutdown, SocketAddr, TcpStream, ToSocketAddrs};
use std::time::Duration;

use crate::config::Config;
use crate::error::{Result, StrataError};
use crate::protocol::{read_response, write_request, Request, Response};

use super::Transport;

/// A blocking TCP session with a storage node
pub struct TcpTransport {
    /// TCP stream reader (buffered for efficiency)
    reader: BufReader<TcpStream>,

    /// TCP stream writer (buffered for efficiency)
    writer: BufWriter<TcpStream>,

    /// Peer address for logging
    peer_addr: String,

    /// Cleared once the session has been shut down
    open: bool,
}

impl TcpTransport {
    /// Establish a session with the node named by the locator
    ///
    /// Applies the connect timeout, disables Nagle's algorithm if configured,
    /// and sets socket read/write timeouts.
    pub fn connect(locator: &str, config: &Config) -> Result<Self> {
        let addr = resolve_locator(locator)?;

        let stream = TcpStream::connect_timeout(&addr, config.connect_timeout)
            .map_err(|e| StrataError::Connection(format!("{}: {}", locator, e)))?;

        let peer_addr = stream
            .peer_addr()
            .map(|a| a.to_string())
            .unwrap_or_else(|_| "unknown".to_string());

        if config.nodelay {
            stream.set_nodelay(true)?;
        }
        if config.read_timeout_ms > 0 {
            stream.set_read_timeout(Some(Duration::from_millis(config.read_timeout_ms)))?;
        }
        if config.write_timeout_ms > 0 {
            stream.set_write_timeout(Some(Duration::from_millis(config.write_timeout_ms)))?;
        }

        // Clone stream for separate read/write handles
        let read_stream = stream.try_clone()?;
        let write_stream = stream;

        tracing::debug!("session established with {}", peer_addr);

        Ok(Self {
            reader: BufReader::new(read_stream),
            writer: BufWriter::new(write_stream),
            peer_addr,
            open: true,
        })
    }
}

impl Transport for TcpTransport {
    fn call(&mut self, request: &Request) -> Result<Response> {
        if !self.open {
            return Err(StrataError::Connection(
                "session already released".to_string(),
            ));
        }

        write_request(&mut self.writer, request)?;
        read_response(&mut self.reader)
    }

    fn close(&mut self) {
        if !self.open {
            return;
        }
        self.open = false;

        let _ = self.writer.flush();
        let _ = self.writer.get_ref().shutdown(Shutdown::Both);
        tracing::debug!("session with {} released", self.peer_addr);
    }
}

impl Drop for TcpTransport {
    fn drop(&mut self) {
        self.close();
    }
}

// =============================================================================
// Locator Resolution
// =============================================================================

/// Resolve a `tcp:host=<host>,port=<port>` locator to a socket address
fn resolve_locator(locator: &str) -> Result<SocketAddr> {
    let params = locator
        .strip_prefix("tcp:")
        .ok_or_else(|| StrataError::Connection(format!("unsupported locator: {}", locator)))?;

    let mut host = None;
    let mut port = None;

    for param in params.split(',') {
        match param.split_once('=') {
            Some(("host", value)) => host = Some(value),
            Some(("port", value)) => {
                let parsed = value.parse::<u16>().map_err(|_| {
                    StrataError::Connection(format!("invalid port in locator: {}", locator))
                })?;
                port = Some(parsed);
            }
            _ => {
                return Err(StrataError::Connection(format!(
                    "malformed locator parameter '{}' in {}",
                    param, locator
                )))
            }
        }
    }

    let host = host
        .ok_or_else(|| StrataError::Connection(format!("locator missing host: {}", locator)))?;
    let port = port
        .ok_or_else(|| StrataError::Connection(format!("locator missing port: {}", locator)))?;

    (host, port)
        .to_socket_addrs()
        .map_err(|e| StrataError::Connection(format!("cannot resolve {}: {}", locator, e)))?
        .next()
        .ok_or_else(|| StrataError::Connection(format!("no address for locator: {}", locator)))
}
