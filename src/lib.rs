//! # DonnyDB
//!
//! Client for the DonnyDB binary key-value protocol:
//! - SET and GET over a single TCP duplex stream
//! - Fixed, length-prefixed little-endian framing
//! - Independent write and read locks shared by all callers
//! - Per-read deadlines with a configurable recovery policy
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     Client (set / get)                       │
//! │            write phase  ──────►  read phase                  │
//! └───────────┬───────────────────────────────┬─────────────────┘
//!             │                               │
//!             ▼                               ▼
//!   ┌───────────────────┐           ┌───────────────────┐
//!   │   Write Lock      │           │    Read Lock      │
//!   │ BufWriter<Tcp>    │           │  BufReader<Tcp>   │
//!   └─────────┬─────────┘           └─────────▲─────────┘
//!             │        ConnectionManager      │
//!             └──────────► TCP stream ────────┘
//!                              ▲
//!                              │
//!                     ┌────────┴────────┐
//!                     │  Protocol codec │
//!                     └─────────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod protocol;
pub mod network;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{DonnyError, Result};
pub use config::{ClientConfig, DesyncPolicy};
pub use network::{Client, ConnectionState};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of the DonnyDB client
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
