use crate::error::DispatchError;
use crate::handler::{Binding, Invocation, OutputBuffer, Visibility};
use crate::http::{Request, Response, PATH_ATTRIBUTE, ROUTED_PATH_ATTRIBUTE};
use crate::registry::{HandlerRegistry, Probe};
use tracing::{debug, error, info};

/// Reserved body segment that receives everything a handler wrote to its
/// output sink during a successful invocation.
pub const DISPATCH_OUTPUT_SEGMENT: &str = "dispatchOutput";

/// How a contract-passing request reaches handler code.
#[derive(Clone, Copy)]
enum Plan {
    Invoke,
    Remap,
}

/// Drives one handler invocation.
///
/// Checks run in a fixed order; the first violated one aborts the dispatch
/// before any handler code has observed the request:
///
/// 1. the request must carry a handler identity;
/// 2. a handler type must be bound to it;
/// 3. the operation must not carry the private `_` marker;
/// 4. the bound type must implement the handler capability;
/// 5. the handler is constructed, and the operation's descriptor decides
///    between direct invocation, the remap fallback, or a contract failure.
#[derive(Debug, Default, Clone, Copy)]
pub struct Dispatcher;

impl Dispatcher {
    pub fn new() -> Self {
        Self
    }

    pub fn dispatch(
        &self,
        registry: &HandlerRegistry,
        request: &Request,
        response: &mut Response,
    ) -> Result<(), DispatchError> {
        let Some(id) = request.handler_id() else {
            return Err(DispatchError::NoHandler {
                path: request
                    .attribute(PATH_ATTRIBUTE)
                    .unwrap_or_default()
                    .to_string(),
                routed_to: request
                    .attribute(ROUTED_PATH_ATTRIBUTE)
                    .map(str::to_string),
            });
        };
        let operation = request.operation();
        let params = request.params();
        debug!(handler = %id, operation = %operation, "dispatch attempt");

        let probe = registry.probe(id);
        if probe == Probe::Missing {
            return Err(DispatchError::HandlerTypeMissing { id: id.clone() });
        }

        if operation.starts_with('_') {
            return Err(DispatchError::PrivateOperationRequested {
                operation: operation.to_string(),
            });
        }

        if probe == Probe::Foreign {
            return Err(DispatchError::NotAHandler { id: id.clone() });
        }

        let mut handler = match registry.construct(id, request) {
            Some(Ok(handler)) => handler,
            Some(Err(err)) => return Err(DispatchError::Runtime(err)),
            // probe() said Constructible; a registry that changes between
            // probe and construct is reported as a missing type.
            None => return Err(DispatchError::HandlerTypeMissing { id: id.clone() }),
        };

        let descriptor = handler
            .operations()
            .iter()
            .find(|op| op.name == operation)
            .copied();
        let plan = match descriptor {
            Some(op) => {
                if op.binding == Binding::Shared {
                    return Err(DispatchError::StaticOperationForbidden {
                        operation: operation.to_string(),
                        id: id.clone(),
                    });
                }
                if op.visibility != Visibility::Public {
                    if handler.has_remap() {
                        Plan::Remap
                    } else {
                        return Err(DispatchError::OperationNotPublic {
                            operation: operation.to_string(),
                            id: id.clone(),
                        });
                    }
                } else if params.len() < op.min_arity {
                    return Err(DispatchError::InsufficientParameters {
                        operation: operation.to_string(),
                        id: id.clone(),
                        required: op.min_arity,
                        supplied: params.len(),
                    });
                } else {
                    Plan::Invoke
                }
            }
            None => {
                if handler.has_remap() {
                    Plan::Remap
                } else {
                    return Err(DispatchError::OperationNotFound {
                        operation: operation.to_string(),
                        id: id.clone(),
                    });
                }
            }
        };

        info!(
            handler = %id,
            operation = %operation,
            params = params.len(),
            remapped = matches!(plan, Plan::Remap),
            "invoking handler"
        );

        // Each attempt owns its own buffer; a failed invocation's partial
        // output is dropped wholesale and never reaches the response.
        let mut out = OutputBuffer::new();
        let result = {
            let mut run = || -> anyhow::Result<()> {
                let mut ctx = Invocation {
                    request,
                    response,
                    out: &mut out,
                };
                handler.before(&mut ctx)?;
                match plan {
                    Plan::Invoke => handler.invoke(&mut ctx, operation, params)?,
                    Plan::Remap => handler.remap(&mut ctx, operation, params)?,
                }
                handler.after(&mut ctx)
            };
            run()
        };

        match result {
            Ok(()) => {
                response.append(DISPATCH_OUTPUT_SEGMENT, out.into_string());
                info!(
                    handler = %id,
                    operation = %operation,
                    status = response.status(),
                    "handler invocation complete"
                );
                Ok(())
            }
            Err(err) => {
                error!(handler = %id, operation = %operation, error = %err, "handler invocation failed");
                Err(DispatchError::Runtime(err))
            }
        }
    }
}
