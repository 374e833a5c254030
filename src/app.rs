//! The orchestrator: one application context owning the router, registry and
//! dispatcher, plus the two-tier error escalation pipeline.
//!
//! In production mode every failure is converted into a sendable response by
//! re-dispatching a synthetic error request to an error handler; in debug
//! mode failures surface as a serialized diagnostic instead, so nothing is
//! swallowed while developing.

use crate::dispatcher::Dispatcher;
use crate::error::DispatchError;
use crate::handler::{Handler, HandlerId, Invocation, OperationSpec};
use crate::http::{Request, Response, PATH_ATTRIBUTE, ROUTED_PATH_ATTRIBUTE};
use crate::registry::{HandlerLocator, HandlerRegistry};
use crate::router::{Router, DEFAULT_MODULE};
use crate::runtime_config::RuntimeConfig;
use serde::Serialize;
use std::fmt::Write as _;
use tracing::{error, warn};

/// A failed dispatch attempt, carried out of [`App::handle`] with everything
/// the escalation pipeline needs: the failure itself, the request that
/// failed, and the module the resolver held concerned.
#[derive(Debug)]
pub struct Escalation {
    pub failure: DispatchError,
    pub request: Request,
    pub module: String,
}

/// Diagnostic payload rendered in debug mode. Chain frames carry error
/// messages only; request argument values never appear here.
#[derive(Debug, Serialize)]
pub struct FaultReport {
    pub kind: &'static str,
    pub status: u16,
    pub message: String,
    pub chain: Vec<String>,
}

impl FaultReport {
    pub fn from_failure(failure: &DispatchError) -> Self {
        let chain = match failure {
            DispatchError::Runtime(err) => err.chain().skip(1).map(|c| c.to_string()).collect(),
            _ => Vec::new(),
        };
        Self {
            kind: failure.kind(),
            status: failure.status_hint(),
            message: failure.to_string(),
            chain,
        }
    }
}

/// Render a debug-mode failure as a JSON diagnostic response.
pub fn diagnostic_response(failure: &DispatchError) -> Response {
    let report = FaultReport::from_failure(failure);
    let mut response = Response::new();
    let _ = response.set_status(report.status);
    response.set_header("Content-Type", "application/json", true);
    let body = serde_json::to_string_pretty(&report).unwrap_or_else(|_| report.message.clone());
    response.set_body(body);
    response
}

/// Application context: built once at startup, read-only afterwards.
pub struct App {
    router: Router,
    registry: HandlerRegistry,
    dispatcher: Dispatcher,
    config: RuntimeConfig,
}

impl App {
    /// Assemble the context. A process must always have a global error
    /// handler, so the reserved `Error` identity gets the built-in one
    /// unless the application registered its own.
    pub fn new(router: Router, mut registry: HandlerRegistry, config: RuntimeConfig) -> Self {
        let error_id = HandlerId::error_handler(DEFAULT_MODULE);
        if !registry.contains(&error_id) {
            registry.register(error_id, |request| {
                DefaultErrorHandler::new(request).map(|handler| Box::new(handler) as Box<dyn Handler>)
            });
        }
        Self {
            router,
            registry,
            dispatcher: Dispatcher::new(),
            config,
        }
    }

    pub fn router(&self) -> &Router {
        &self.router
    }

    pub fn registry(&self) -> &HandlerRegistry {
        &self.registry
    }

    pub fn config(&self) -> RuntimeConfig {
        self.config
    }

    /// Resolve and dispatch one request, surfacing any failure to the
    /// caller. A resolution miss still enters the dispatcher, so `NoHandler`
    /// takes the same escalation path as every other failure.
    pub fn handle(&self, raw_path: &str) -> Result<Response, Escalation> {
        let resolution = self.router.resolve(raw_path, &self.registry);
        let module = resolution.module;

        let mut request = match resolution.route {
            Some(route) => Request::from_route(route),
            None => Request::new(module.clone()),
        };
        request.set_attribute(PATH_ATTRIBUTE, raw_path);
        if let Some(routed) = resolution.rewritten {
            request.set_attribute(ROUTED_PATH_ATTRIBUTE, routed);
        }

        let mut response = Response::new();
        match self.dispatcher.dispatch(&self.registry, &request, &mut response) {
            Ok(()) => Ok(response),
            Err(failure) => Err(Escalation {
                failure,
                request,
                module,
            }),
        }
    }

    /// Drive one request end-to-end, honoring the debug/production switch.
    /// Always yields a sendable response.
    pub fn run(&self, raw_path: &str) -> Response {
        match self.handle(raw_path) {
            Ok(response) => response,
            Err(escalation) if self.config.debug => {
                error!(
                    kind = escalation.failure.kind(),
                    error = %escalation.failure,
                    "dispatch failed; rendering debug diagnostics"
                );
                diagnostic_response(&escalation.failure)
            }
            Err(escalation) => self.escalate(escalation),
        }
    }

    /// Second tier: discard the failed attempt's response, dispatch a
    /// synthetic error request to the concerned module's error handler (or
    /// the global one), and if even that fails, fall back to a bare
    /// status-coded response. Nothing propagates past this point.
    fn escalate(&self, escalation: Escalation) -> Response {
        let Escalation {
            failure,
            request,
            module,
        } = escalation;
        warn!(
            kind = failure.kind(),
            module = %module,
            error = %failure,
            "escalating dispatch failure to error handler"
        );

        let mut error_id = HandlerId::error_handler(DEFAULT_MODULE);
        if module != DEFAULT_MODULE {
            let scoped = HandlerId::error_handler(&module);
            if self.registry.locate(&scoped) {
                error_id = scoped;
            }
        }

        let status = failure.status_hint();
        let error_request = Request::error_variant(failure, request, error_id);
        let mut error_response = Response::new();
        match self
            .dispatcher
            .dispatch(&self.registry, &error_request, &mut error_response)
        {
            Ok(()) => error_response,
            Err(err) => {
                error!(
                    kind = err.kind(),
                    error = %err,
                    "error handler dispatch failed; emitting bare response"
                );
                bare_response(status)
            }
        }
    }
}

/// Minimal last-resort response when the error handler itself fails.
fn bare_response(status: u16) -> Response {
    let mut response = Response::new();
    let _ = response.set_status(status);
    response.set_body(match status {
        404 => "404 Not Found\n",
        _ => "503 Service Unavailable\n",
    });
    response
}

const ERROR_OPERATIONS: &[OperationSpec] = &[OperationSpec::public("index", 0)];

/// Fallback error handler installed under the reserved `Error` identity.
///
/// Error handlers are only reachable through the escalation pipeline:
/// constructing one from a non-error request fails, which means requesting
/// the `error` URL directly becomes a failure of its own and escalates like
/// any other.
pub struct DefaultErrorHandler;

impl DefaultErrorHandler {
    pub fn new(request: &Request) -> anyhow::Result<Self> {
        if !request.is_error() {
            anyhow::bail!(crate::error::HttpError::not_found(
                "error handler requested as an ordinary route"
            ));
        }
        Ok(Self)
    }
}

impl Handler for DefaultErrorHandler {
    fn operations(&self) -> &'static [OperationSpec] {
        ERROR_OPERATIONS
    }

    fn invoke(
        &mut self,
        ctx: &mut Invocation<'_>,
        _operation: &str,
        _params: &[String],
    ) -> anyhow::Result<()> {
        let Some(context) = ctx.request.error() else {
            anyhow::bail!("error handler invoked without an error context");
        };
        match context.failure.status_hint() {
            404 => {
                ctx.response.set_status(404)?;
                write!(ctx.out, "Sorry, the page you requested was not found.")?;
            }
            _ => {
                ctx.response.set_status(503)?;
                write!(
                    ctx.out,
                    "The service is temporarily unavailable. Please try again later."
                )?;
            }
        }
        Ok(())
    }
}
