//! Response definitions
//!
//! Represents responses sent back to clients.

/// A response to a single request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    /// Outcome of a SET
    SetResult { ok: bool },

    /// Value returned by a GET (empty for a missing key)
    GetResult(Vec<u8>),
}

impl Response {
    /// Create a successful SET response
    pub fn set_ok() -> Self {
        Self::SetResult { ok: true }
    }

    /// Create a failed SET response
    pub fn set_failed() -> Self {
        Self::SetResult { ok: false }
    }

    /// Create a GET response carrying `value`
    pub fn value(value: impl Into<Vec<u8>>) -> Self {
        Self::GetResult(value.into())
    }
}
