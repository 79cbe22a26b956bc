//! Request definitions
//!
//! Represents requests sent by clients.

/// Request types, identified on the wire by a 3-byte ASCII tag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestType {
    Get,
    Set,
}

impl RequestType {
    /// The ASCII tag that opens a frame of this type
    pub const fn tag(self) -> &'static [u8; 3] {
        match self {
            RequestType::Get => b"GET",
            RequestType::Set => b"SET",
        }
    }

    /// Look up a request type by its tag
    pub fn from_tag(tag: &[u8]) -> Option<Self> {
        match tag {
            b"GET" => Some(RequestType::Get),
            b"SET" => Some(RequestType::Set),
            _ => None,
        }
    }
}

/// A parsed request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    /// Get a value by key
    Get { key: String },

    /// Set a key to a value
    Set { key: String, value: Vec<u8> },
}

impl Request {
    /// Get the request type
    pub fn request_type(&self) -> RequestType {
        match self {
            Request::Get { .. } => RequestType::Get,
            Request::Set { .. } => RequestType::Set,
        }
    }

    /// The key this request addresses
    pub fn key(&self) -> &str {
        match self {
            Request::Get { key } | Request::Set { key, .. } => key,
        }
    }
}
