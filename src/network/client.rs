//! Client
//!
//! Executes SET and GET requests over the shared connection.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};

use bytes::Bytes;

use crate::config::{ClientConfig, DesyncPolicy};
use crate::error::{DonnyError, Result};
use crate::protocol::{
    decode_set_response, decode_value_len, encode_get, encode_set,
    LEN_SIZE, SET_RESPONSE_SIZE,
};
use super::connection::{ConnectionManager, ConnectionState, ReadHalf};

/// Client for a DonnyDB server
///
/// Every call has a write phase (under the write lock) followed by a read
/// phase (under the read lock). The two phases are *not* atomic together:
/// between them another thread may write its own request or win the read
/// lock first. Since the protocol has no request id and the server answers
/// in arrival order, a call that loses that race reads someone else's
/// response. Sharing one `Client` between threads is only safe when callers
/// serialize their own calls; otherwise a value returned by `get` may belong
/// to a different key.
///
/// Mixing concurrent `set` and `get` calls is worse than a swap: a `set`
/// that wins the read lock ahead of a GET reply consumes the first 3 bytes
/// of that reply's length prefix, and every later read is misaligned without
/// any error being raised.
///
/// # Example
///
/// ```no_run
/// use donnydb::{Client, ClientConfig};
///
/// let client = Client::open(ClientConfig::default())?;
/// assert!(client.set("a", b"1")?);
/// assert_eq!(client.get("a")?, b"1");
/// client.close()?;
/// # Ok::<(), donnydb::DonnyError>(())
/// ```
pub struct Client {
    config: ClientConfig,
    conn: ConnectionManager,

    /// Set when a write or read failed part-way and the policy is `Poison`
    desynced: AtomicBool,
}

impl Client {
    /// Create a client without connecting
    pub fn new(config: ClientConfig) -> Self {
        Self {
            conn: ConnectionManager::new(config.clone()),
            config,
            desynced: AtomicBool::new(false),
        }
    }

    /// Create a client and connect it
    pub fn open(config: ClientConfig) -> Result<Self> {
        let client = Self::new(config);
        client.connect()?;
        Ok(client)
    }

    /// Connect to the configured server
    pub fn connect(&self) -> Result<()> {
        self.conn.connect()
    }

    /// Close the connection, waiting for in-flight operations first
    pub fn close(&self) -> Result<()> {
        self.conn.close()
    }

    /// Current lifecycle state
    pub fn state(&self) -> ConnectionState {
        self.conn.state()
    }

    /// Address of the connected server, if any
    pub fn peer_addr(&self) -> Option<SocketAddr> {
        self.conn.peer_addr()
    }

    /// Client configuration
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// True once a failed write or read has poisoned the stream
    pub fn is_desynchronized(&self) -> bool {
        self.desynced.load(Ordering::Acquire)
    }

    /// Set `key` to `value`
    ///
    /// Returns `Ok(false)` if the server answered with anything other than
    /// the OK marker. A missed deadline is `Err(Timeout)`, never `Ok(false)`.
    pub fn set(&self, key: &str, value: &[u8]) -> Result<bool> {
        tracing::trace!("SET '{}' ({} bytes)", key, value.len());
        self.send(|| encode_set(key, value))?;

        let response = self.receive(|half| {
            let mut buf = [0u8; SET_RESPONSE_SIZE];
            half.read_exact_within(&mut buf, self.config.read_timeout)?;
            Ok(buf)
        })?;

        let ok = decode_set_response(&response)?;
        if !ok {
            tracing::debug!("SET '{}' rejected by server: {:02x?}", key, response);
        }
        Ok(ok)
    }

    /// Fetch the value stored under `key`
    ///
    /// A missing key and an empty value both come back as an empty vector;
    /// the protocol does not tell them apart.
    pub fn get(&self, key: &str) -> Result<Vec<u8>> {
        tracing::trace!("GET '{}'", key);
        self.send(|| encode_get(key))?;

        let value = self.receive(|half| {
            let mut prefix = [0u8; LEN_SIZE];
            half.read_exact_within(&mut prefix, self.config.read_timeout)?;
            let len = decode_value_len(prefix, self.config.max_value_len)?;

            let mut value = vec![0u8; len];
            half.read_exact_within(&mut value, self.config.read_timeout)?;
            Ok(value)
        })?;

        tracing::trace!("GET '{}' -> {} bytes", key, value.len());
        Ok(value)
    }

    /// Write phase: encode and flush one frame under the write lock
    ///
    /// A failed write may leave part of the frame on the wire, so it counts
    /// as a stream failure. Encoding errors happen before any byte is sent.
    fn send(&self, encode: impl FnOnce() -> Result<Bytes>) -> Result<()> {
        self.conn.with_write_lock(|half| {
            if self.is_desynchronized() {
                return Err(DonnyError::Desynchronized);
            }
            let frame = encode()?;
            half.send(&frame).map_err(|e| {
                self.on_stream_failure("Write to", &e);
                e
            })
        })
    }

    /// Read phase: run `read` under the read lock
    ///
    /// Any failure after bytes may have been consumed leaves the stream at an
    /// unknown offset; under `DesyncPolicy::Poison` that ends this client.
    /// The flag is checked again here because a caller may have finished its
    /// write phase before another caller's read poisoned the stream.
    fn receive<T>(&self, read: impl FnOnce(&mut ReadHalf) -> Result<T>) -> Result<T> {
        self.conn.with_read_lock(|half| {
            if self.is_desynchronized() {
                return Err(DonnyError::Desynchronized);
            }
            let result = read(half);
            if let Err(ref e) = result {
                self.on_stream_failure("Read from", e);
            }
            result
        })
    }

    fn on_stream_failure(&self, op: &str, err: &DonnyError) {
        match self.config.desync_policy {
            DesyncPolicy::Poison => {
                if !self.desynced.swap(true, Ordering::AcqRel) {
                    tracing::warn!(
                        "{} {} failed ({}); refusing further requests on this connection",
                        op,
                        self.config.addr(),
                        err
                    );
                }
            }
            DesyncPolicy::Tolerate => {
                tracing::warn!(
                    "{} {} failed ({}); stream may now be misaligned",
                    op,
                    self.config.addr(),
                    err
                );
            }
        }
    }
}
