//! URL resolution: rewrite rules, module aliases, and the longest-prefix
//! handler search.
//!
//! The router owns the declared route table and module alias map; the actual
//! matching lives in [`core`]. Resolution never constructs anything — it only
//! asks a [`crate::registry::HandlerLocator`] whether a candidate identity
//! exists.

mod core;

pub use core::{
    ParamVec, Resolution, ResolvedRoute, Router, DEFAULT_MODULE, MAX_INLINE_PARAMS,
};
