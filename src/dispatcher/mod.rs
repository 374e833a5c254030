//! Handler invocation under the lifecycle contract.
//!
//! The dispatcher takes a resolved [`crate::http::Request`], constructs the
//! named handler through the registry, checks the requested operation against
//! the handler's descriptor table, and runs the `before` / operation /
//! `after` sequence with all output captured in a scoped buffer.

mod core;

pub use core::{Dispatcher, DISPATCH_OUTPUT_SEGMENT};
