use crate::error::DispatchError;
use crate::handler::HandlerId;
use crate::router::{ParamVec, ResolvedRoute, DEFAULT_MODULE};
use std::collections::HashMap;

/// Attribute key under which the orchestrator records the raw request path.
pub const PATH_ATTRIBUTE: &str = "requestPath";

/// Attribute key under which the orchestrator records the effective path a
/// route rule rewrote the request to.
pub const ROUTED_PATH_ATTRIBUTE: &str = "routedPath";

/// Failure context carried by the error variant of a request: the triggering
/// failure plus the request that failed, so error handlers can inspect both.
#[derive(Debug)]
pub struct ErrorContext {
    pub failure: DispatchError,
    pub original: Box<Request>,
}

/// Routing facts for one unit of work.
///
/// Everything except the `attributes` side channel is fixed at construction;
/// the dispatcher and handlers read it, they never reshape it.
#[derive(Debug)]
pub struct Request {
    module: String,
    handler_id: Option<HandlerId>,
    operation: String,
    params: ParamVec,
    attributes: HashMap<String, String>,
    error: Option<ErrorContext>,
}

impl Request {
    /// An unresolved request: the concerned module is known but no handler
    /// was found. Dispatching it fails with `NoHandler`, which keeps
    /// resolution misses on the same escalation path as every other failure.
    pub fn new(module: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            handler_id: None,
            operation: "index".to_string(),
            params: ParamVec::new(),
            attributes: HashMap::new(),
            error: None,
        }
    }

    pub fn from_route(route: ResolvedRoute) -> Self {
        Self {
            module: route.module,
            handler_id: Some(route.handler_id),
            operation: route.operation,
            params: route.params,
            attributes: HashMap::new(),
            error: None,
        }
    }

    /// A fully specified request, used by entry surfaces that address a
    /// handler directly (console commands, tests).
    pub fn for_handler(
        module: impl Into<String>,
        handler_id: HandlerId,
        operation: impl Into<String>,
        params: ParamVec,
    ) -> Self {
        Self {
            module: module.into(),
            handler_id: Some(handler_id),
            operation: operation.into(),
            params,
            attributes: HashMap::new(),
            error: None,
        }
    }

    /// The synthetic request the escalation pipeline dispatches to an error
    /// handler: module fixed to the default, operation fixed to `index`,
    /// owning the failure and the request that produced it.
    pub fn error_variant(
        failure: DispatchError,
        original: Request,
        handler_id: HandlerId,
    ) -> Self {
        Self {
            module: DEFAULT_MODULE.to_string(),
            handler_id: Some(handler_id),
            operation: "index".to_string(),
            params: ParamVec::new(),
            attributes: HashMap::new(),
            error: Some(ErrorContext {
                failure,
                original: Box::new(original),
            }),
        }
    }

    pub fn module(&self) -> &str {
        &self.module
    }

    pub fn handler_id(&self) -> Option<&HandlerId> {
        self.handler_id.as_ref()
    }

    pub fn operation(&self) -> &str {
        &self.operation
    }

    pub fn params(&self) -> &[String] {
        &self.params
    }

    pub fn param(&self, index: usize) -> Option<&str> {
        self.params.get(index).map(String::as_str)
    }

    /// Side channel for facts attached after construction.
    pub fn set_attribute(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.attributes.insert(key.into(), value.into());
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    pub fn error(&self) -> Option<&ErrorContext> {
        self.error.as_ref()
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use smallvec::smallvec;

    #[test]
    fn error_variant_pins_module_and_operation() {
        let original = Request::for_handler(
            "Blog",
            HandlerId::from("Blog::Posts"),
            "show",
            smallvec!["42".to_string()],
        );
        let failure = DispatchError::OperationNotFound {
            operation: "show".into(),
            id: HandlerId::from("Blog::Posts"),
        };
        let error = Request::error_variant(failure, original, HandlerId::error_handler("Blog"));

        assert_eq!(error.module(), DEFAULT_MODULE);
        assert_eq!(error.operation(), "index");
        assert!(error.params().is_empty());
        assert!(error.is_error());

        let ctx = error.error().unwrap();
        assert_eq!(ctx.original.module(), "Blog");
        assert_eq!(ctx.original.param(0), Some("42"));
    }

    #[test]
    fn attributes_are_the_only_mutable_surface() {
        let mut request = Request::new("Default");
        assert!(request.attribute(ROUTED_PATH_ATTRIBUTE).is_none());
        request.set_attribute(ROUTED_PATH_ATTRIBUTE, "catalog/lookup/52");
        assert_eq!(
            request.attribute(ROUTED_PATH_ATTRIBUTE),
            Some("catalog/lookup/52")
        );
    }
}
