//! Request/Response model for the dispatch pipeline.
//!
//! A [`Request`] is routing fact: module, handler identity, operation and
//! positional params, plus a string-keyed attribute side channel. A
//! [`Response`] accumulates named body segments, normalized headers and a
//! validated status code, and serializes itself over any `io::Write`.

mod request;
mod response;

pub use request::{ErrorContext, Request, PATH_ATTRIBUTE, ROUTED_PATH_ATTRIBUTE};
pub use response::{Response, ResponseError};
