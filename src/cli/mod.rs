//! Console entry surface.
//!
//! Commands are ordinary handlers registered under `Command::<Name>`
//! identities and run through the same dispatcher and invocation contract as
//! web requests.

mod runner;

pub use runner::{init_tracing, run, Cli, CommandRunner};
