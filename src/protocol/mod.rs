//! Protocol Module
//!
//! Defines the wire protocol spoken between client and server.
//!
//! ## Protocol Format
//!
//! All integers are little-endian `u64`.
//!
//! ### Requests
//! ```text
//! SET: ┌─────────┬─────────────┬─────┬───────────────┬───────┐
//!      │ "SET"(3)│ key_len (8) │ key │ value_len (8) │ value │
//!      └─────────┴─────────────┴─────┴───────────────┴───────┘
//! GET: ┌─────────┬─────────────┬─────┐
//!      │ "GET"(3)│ key_len (8) │ key │
//!      └─────────┴─────────────┴─────┘
//! ```
//!
//! ### Responses
//! ```text
//! SET: ┌──────────────┐
//!      │ "OK\0" (3)   │   any other 3 bytes = failure
//!      └──────────────┘
//! GET: ┌─────────┬───────┐
//!      │ len (8) │ value │
//!      └─────────┴───────┘
//! ```
//!
//! There is no request id. Responses are matched to requests purely by
//! arrival order, and a GET for a missing key is indistinguishable from a
//! GET for an empty value (both are `len = 0`).

mod request;
mod response;
mod codec;

pub use request::{Request, RequestType};
pub use response::Response;
pub use codec::{
    encode_get, encode_set, encode_request, decode_request,
    encode_response, decode_get_response, decode_set_response, decode_value_len,
    read_request, write_request, write_response,
    TAG_SIZE, LEN_SIZE, SET_RESPONSE_SIZE, OK_RESPONSE,
};
