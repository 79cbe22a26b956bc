//! Connection Manager
//!
//! Owns the single TCP stream of a client and hands out its two halves
//! under two independent locks.

use std::fmt;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::net::{Shutdown, SocketAddr, TcpStream, ToSocketAddrs};
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use crate::config::ClientConfig;
use crate::error::{DonnyError, Result};

/// Lifecycle state of a connection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Uninitialized,
    Active,
    Closed,
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ConnectionState::Uninitialized => "uninitialized",
            ConnectionState::Active => "active",
            ConnectionState::Closed => "closed",
        };
        f.write_str(name)
    }
}

/// Write direction of the stream (buffered)
pub struct WriteHalf {
    writer: BufWriter<TcpStream>,
}

impl WriteHalf {
    /// Write one complete frame and flush it to the socket
    pub fn send(&mut self, frame: &[u8]) -> Result<()> {
        self.writer.write_all(frame)?;
        self.writer.flush()?;
        Ok(())
    }

    fn shutdown(mut self) -> Result<()> {
        self.writer.flush()?;
        match self.writer.get_ref().shutdown(Shutdown::Write) {
            Ok(()) => Ok(()),
            // Peer already gone; nothing left to shut down
            Err(e) if e.kind() == io::ErrorKind::NotConnected => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Read direction of the stream (buffered)
pub struct ReadHalf {
    reader: BufReader<TcpStream>,
}

impl ReadHalf {
    /// Fill `buf` completely or fail once `timeout` has elapsed
    ///
    /// The deadline covers the whole buffer, not each syscall: the socket
    /// timeout is re-armed with the remaining time before every partial read.
    /// On timeout, any bytes already consumed are lost.
    pub fn read_exact_within(&mut self, buf: &mut [u8], timeout: Duration) -> Result<()> {
        let deadline = Instant::now() + timeout;
        let mut filled = 0;

        while filled < buf.len() {
            // Bytes already buffered need no syscall and no deadline
            if self.reader.buffer().is_empty() {
                let remaining = deadline.saturating_duration_since(Instant::now());
                if remaining.is_zero() {
                    return Err(DonnyError::Timeout(timeout));
                }
                self.reader.get_ref().set_read_timeout(Some(remaining))?;
            }

            match self.reader.read(&mut buf[filled..]) {
                Ok(0) => return Err(DonnyError::ConnectionClosed),
                Ok(n) => filled += n,
                Err(e) if is_timeout(&e) => return Err(DonnyError::Timeout(timeout)),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }

        Ok(())
    }
}

fn is_timeout(err: &io::Error) -> bool {
    // Unix reports an expired SO_RCVTIMEO as WouldBlock, Windows as TimedOut
    matches!(err.kind(), io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut)
}

/// Owns one TCP duplex stream and its lifecycle
///
/// ## Locking
///
/// The write half and the read half sit behind two independent mutexes.
/// Whenever both are needed (`connect`, `close`) they are taken in the
/// order write → read → state.
pub struct ConnectionManager {
    config: ClientConfig,
    state: Mutex<ConnectionState>,
    writer: Mutex<Option<WriteHalf>>,
    reader: Mutex<Option<ReadHalf>>,
    peer_addr: Mutex<Option<SocketAddr>>,
}

impl ConnectionManager {
    /// Create an unconnected manager
    pub fn new(config: ClientConfig) -> Self {
        Self {
            config,
            state: Mutex::new(ConnectionState::Uninitialized),
            writer: Mutex::new(None),
            reader: Mutex::new(None),
            peer_addr: Mutex::new(None),
        }
    }

    /// Current lifecycle state
    pub fn state(&self) -> ConnectionState {
        *self.state.lock()
    }

    /// Address of the connected server, if any
    pub fn peer_addr(&self) -> Option<SocketAddr> {
        *self.peer_addr.lock()
    }

    /// Open the TCP stream (Uninitialized → Active)
    pub fn connect(&self) -> Result<()> {
        let mut writer = self.writer.lock();
        let mut reader = self.reader.lock();
        let mut state = self.state.lock();

        if *state != ConnectionState::Uninitialized {
            return Err(DonnyError::InvalidState(*state));
        }
        self.config.validate()?;

        let stream = open_stream(&self.config)?;
        stream.set_nodelay(self.config.nodelay)?;
        let peer = stream.peer_addr()?;

        // Clone stream for separate read/write handles
        let read_stream = stream.try_clone()?;
        *writer = Some(WriteHalf {
            writer: BufWriter::new(stream),
        });
        *reader = Some(ReadHalf {
            reader: BufReader::new(read_stream),
        });
        *self.peer_addr.lock() = Some(peer);
        *state = ConnectionState::Active;

        tracing::debug!("Connected to {} ({})", self.config.addr(), peer);
        Ok(())
    }

    /// Tear down the stream (Active → Closed)
    ///
    /// Holds both locks, so it waits for any in-flight write and read to
    /// finish. Closing twice is a precondition violation.
    pub fn close(&self) -> Result<()> {
        let mut writer = self.writer.lock();
        let mut reader = self.reader.lock();
        let mut state = self.state.lock();

        if *state != ConnectionState::Active {
            return Err(DonnyError::InvalidState(*state));
        }
        *state = ConnectionState::Closed;

        // Dropping the read half marks it at end-of-stream for good
        reader.take();
        let result = match writer.take() {
            Some(half) => half.shutdown(),
            None => Ok(()),
        };

        tracing::debug!("Closed connection to {}", self.config.addr());
        result
    }

    /// Run `f` with exclusive access to the write half
    ///
    /// The lock is released when `f` returns, errors, or panics.
    pub fn with_write_lock<T>(&self, f: impl FnOnce(&mut WriteHalf) -> Result<T>) -> Result<T> {
        let mut guard = self.writer.lock();
        match guard.as_mut() {
            Some(half) => f(half),
            None => Err(DonnyError::InvalidState(self.state())),
        }
    }

    /// Run `f` with exclusive access to the read half
    ///
    /// The lock is released when `f` returns, errors, or panics.
    pub fn with_read_lock<T>(&self, f: impl FnOnce(&mut ReadHalf) -> Result<T>) -> Result<T> {
        let mut guard = self.reader.lock();
        match guard.as_mut() {
            Some(half) => f(half),
            None => Err(DonnyError::InvalidState(self.state())),
        }
    }
}

fn open_stream(config: &ClientConfig) -> Result<TcpStream> {
    let addr = config.addr();
    let connect_err = |source: io::Error| DonnyError::Connection {
        addr: addr.clone(),
        source,
    };

    let timeout = match config.connect_timeout {
        Some(timeout) => timeout,
        None => return TcpStream::connect((config.host.as_str(), config.port)).map_err(connect_err),
    };

    // connect_timeout needs a resolved address; try each in turn
    let mut last_err = None;
    for sock_addr in (config.host.as_str(), config.port)
        .to_socket_addrs()
        .map_err(connect_err)?
    {
        match TcpStream::connect_timeout(&sock_addr, timeout) {
            Ok(stream) => return Ok(stream),
            Err(e) => last_err = Some(e),
        }
    }

    Err(connect_err(last_err.unwrap_or_else(|| {
        io::Error::new(io::ErrorKind::InvalidInput, "address resolved to nothing")
    })))
}
