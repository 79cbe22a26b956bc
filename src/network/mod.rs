//! Network Module
//!
//! TCP connection handling and request execution.
//!
//! ## Architecture
//! - `ConnectionManager` owns one TCP stream, split into a write half and a
//!   read half behind two independent locks
//! - `Client` runs each request as a write phase then a read phase

mod connection;
mod client;

pub use connection::{ConnectionManager, ConnectionState, ReadHalf, WriteHalf};
pub use client::Client;
