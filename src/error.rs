//! Failure taxonomy for the resolution and dispatch pipeline.
//!
//! Every way a request can fail between path resolution and a completed
//! handler invocation is a [`DispatchError`] kind. Structural kinds describe
//! a request that could not be mapped onto a handler operation; the
//! [`DispatchError::Runtime`] kind wraps any failure raised by application
//! handler code itself.

use crate::handler::HandlerId;
use std::fmt;

/// Typed failure a handler raises to force a specific response status.
///
/// Handler code wraps this in `anyhow::Error`; the escalation pipeline
/// downcasts it back out to pick the response status. Anything else that
/// escapes a handler is reported as 503.
#[derive(Debug)]
pub struct HttpError {
    pub status: u16,
    pub message: String,
}

impl HttpError {
    pub fn new(status: u16, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(404, message)
    }
}

impl fmt::Display for HttpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.status, self.message)
    }
}

impl std::error::Error for HttpError {}

/// A failed dispatch attempt.
///
/// The structural kinds carry enough context to tell the operator what went
/// wrong and what to create or rename to fix it; the `Display` text keeps
/// that help inline, one line per failure.
#[derive(Debug)]
pub enum DispatchError {
    /// No handler source exists for any prefix of the requested path.
    NoHandler {
        path: String,
        routed_to: Option<String>,
    },
    /// A handler source was located but no handler type is bound to it.
    HandlerTypeMissing { id: HandlerId },
    /// The type bound to the identity does not implement the `Handler`
    /// capability.
    NotAHandler { id: HandlerId },
    /// The requested operation carries the private `_` marker.
    PrivateOperationRequested { operation: String },
    /// The operation exists but is declared with shared (non-instance)
    /// binding.
    StaticOperationForbidden { operation: String, id: HandlerId },
    /// The operation exists but is not public, and the handler defines no
    /// remap fallback.
    OperationNotPublic { operation: String, id: HandlerId },
    /// No such operation on the handler, and no remap fallback is defined.
    OperationNotFound { operation: String, id: HandlerId },
    /// Fewer positional parameters than the operation's declared minimum.
    InsufficientParameters {
        operation: String,
        id: HandlerId,
        required: usize,
        supplied: usize,
    },
    /// A failure raised by handler code: constructor, lifecycle hook, or the
    /// operation body.
    Runtime(anyhow::Error),
}

impl DispatchError {
    /// Short stable name of the failure kind, for structured log fields and
    /// diagnostics. Argument values never appear here.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NoHandler { .. } => "NoHandler",
            Self::HandlerTypeMissing { .. } => "HandlerTypeMissing",
            Self::NotAHandler { .. } => "NotAHandler",
            Self::PrivateOperationRequested { .. } => "PrivateOperationRequested",
            Self::StaticOperationForbidden { .. } => "StaticOperationForbidden",
            Self::OperationNotPublic { .. } => "OperationNotPublic",
            Self::OperationNotFound { .. } => "OperationNotFound",
            Self::InsufficientParameters { .. } => "InsufficientParameters",
            Self::Runtime(_) => "UnhandledRuntimeFailure",
        }
    }

    /// Whether the failure is a structural resolution/contract violation as
    /// opposed to a failure inside handler code.
    pub fn is_structural(&self) -> bool {
        !matches!(self, Self::Runtime(_))
    }

    /// Response status this failure maps to when it reaches the escalation
    /// pipeline. Structural failures are "not found" conditions; runtime
    /// failures carry the status of a raised [`HttpError`] if there is one,
    /// and read as service-unavailable otherwise.
    pub fn status_hint(&self) -> u16 {
        match self {
            Self::Runtime(err) => err
                .downcast_ref::<HttpError>()
                .map(|http| http.status)
                .unwrap_or(503),
            _ => 404,
        }
    }
}

impl fmt::Display for DispatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoHandler { path, routed_to } => {
                write!(f, "no handler found for request path `{path}`")?;
                if let Some(routed) = routed_to {
                    write!(f, " (routed to `{routed}`)")?;
                }
                write!(f, "; register a handler that can serve this path")
            }
            Self::HandlerTypeMissing { id } => write!(
                f,
                "a source for `{id}` was located but no handler type is bound to it; \
                 bind a constructible handler under that identity"
            ),
            Self::NotAHandler { id } => write!(
                f,
                "`{id}` does not implement the handler capability; \
                 everything dispatched to must implement `Handler`"
            ),
            Self::PrivateOperationRequested { operation } => write!(
                f,
                "operation `{operation}` is for private access only; \
                 names beginning with `_` cannot be requested"
            ),
            Self::StaticOperationForbidden { operation, id } => write!(
                f,
                "operation `{operation}` on `{id}` has shared binding; \
                 requested operations must be bound to a handler instance"
            ),
            Self::OperationNotPublic { operation, id } => write!(
                f,
                "operation `{operation}` on `{id}` is not public and no remap \
                 fallback is defined"
            ),
            Self::OperationNotFound { operation, id } => write!(
                f,
                "no operation `{operation}` on `{id}`; define it or provide a \
                 remap fallback to catch unmatched operations"
            ),
            Self::InsufficientParameters {
                operation,
                id,
                required,
                supplied,
            } => write!(
                f,
                "operation `{operation}` on `{id}` requires at least {required} \
                 parameter(s), {supplied} supplied"
            ),
            Self::Runtime(err) => write!(f, "unhandled failure in handler code: {err}"),
        }
    }
}

impl std::error::Error for DispatchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Runtime(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}
