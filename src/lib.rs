//! # waypoint
//!
//! A URL-to-handler resolution and dispatch pipeline.
//!
//! A raw request path is rewritten through a user-declared route table,
//! split on a module alias, and resolved to a handler identity by a
//! longest-prefix search over the registry. The dispatcher then constructs
//! the handler, checks the requested operation against the handler's static
//! descriptor table (visibility, binding, arity), and runs the
//! `before` → operation → `after` sequence with all output captured in a
//! scoped buffer. Failures at any point escalate through a two-tier error
//! pipeline that re-dispatches a synthetic error request, so production mode
//! always yields a sendable response.
//!
//! ## Components
//!
//! - [`router`] — route table rewriting, module aliases, longest-prefix
//!   handler search
//! - [`dispatcher`] — the invocation contract and output capture
//! - [`http`] — the [`Request`] / [`Response`] model
//! - [`handler`] — the [`Handler`] capability and operation descriptors
//! - [`registry`] — handler identities, factories, and the locator seam
//! - [`app`] — the orchestrator and the error escalation pipeline
//! - [`cli`] — console command runner sharing the invocation contract
//!
//! ## Example
//!
//! ```
//! use std::fmt::Write as _;
//! use waypoint::{
//!     App, Handler, HandlerRegistry, Invocation, OperationSpec, Router, RuntimeConfig,
//! };
//!
//! struct Pages;
//!
//! impl Handler for Pages {
//!     fn operations(&self) -> &'static [OperationSpec] {
//!         const OPS: &[OperationSpec] = &[OperationSpec::public("about", 0)];
//!         OPS
//!     }
//!
//!     fn invoke(
//!         &mut self,
//!         ctx: &mut Invocation<'_>,
//!         _operation: &str,
//!         _params: &[String],
//!     ) -> anyhow::Result<()> {
//!         write!(ctx.out, "about us")?;
//!         Ok(())
//!     }
//! }
//!
//! let mut registry = HandlerRegistry::new();
//! registry.register("Pages", |_| Ok(Box::new(Pages) as Box<dyn Handler>));
//!
//! let app = App::new(Router::new(), registry, RuntimeConfig::default());
//! let response = app.run("/pages/about");
//! assert_eq!(response.segment("dispatchOutput"), Some("about us"));
//! ```

pub mod app;
pub mod cli;
pub mod dispatcher;
pub mod error;
pub mod handler;
pub mod http;
pub mod registry;
pub mod router;
pub mod runtime_config;

pub use app::{diagnostic_response, App, DefaultErrorHandler, Escalation, FaultReport};
pub use dispatcher::{Dispatcher, DISPATCH_OUTPUT_SEGMENT};
pub use error::{DispatchError, HttpError};
pub use handler::{
    Binding, Handler, HandlerFactory, HandlerId, Invocation, OperationSpec, OutputBuffer,
    Visibility,
};
pub use http::{ErrorContext, Request, Response, ResponseError};
pub use registry::{HandlerLocator, HandlerRegistry, Probe};
pub use router::{ParamVec, Resolution, ResolvedRoute, Router, DEFAULT_MODULE};
pub use runtime_config::RuntimeConfig;
