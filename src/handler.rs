//! The handler capability: what a unit of dispatchable work looks like.
//!
//! A handler declares its callable surface up front as a static table of
//! [`OperationSpec`] descriptors. The dispatcher checks visibility, binding
//! and arity against that table before any handler code runs, so a handler's
//! `invoke` only ever sees operations that passed the contract.

use crate::http::{Request, Response};
use std::fmt;

/// Namespaced handler identity: `Foo::Bar` in the default module,
/// `Blog::Foo::Bar` under the `Blog` module.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HandlerId(String);

impl HandlerId {
    /// Compose an identity from a module name and a title-cased,
    /// `/`-separated handler path. The default module carries no prefix.
    pub fn compose(module: &str, handler_path: &str) -> Self {
        let joined = handler_path.replace('/', "::");
        if module == crate::router::DEFAULT_MODULE {
            Self(joined)
        } else {
            Self(format!("{module}::{joined}"))
        }
    }

    /// Reserved identity of a module's error handler: `Error` for the
    /// default module, `<Module>::Error` otherwise.
    pub fn error_handler(module: &str) -> Self {
        if module == crate::router::DEFAULT_MODULE {
            Self("Error".to_string())
        } else {
            Self(format!("{module}::Error"))
        }
    }

    /// Identity of a console command: `Command::<Name>` with the first
    /// letter of the command name title-cased.
    pub fn command(name: &str) -> Self {
        let mut titled = String::with_capacity(name.len());
        let mut chars = name.chars();
        if let Some(first) = chars.next() {
            titled.push(first.to_ascii_uppercase());
            titled.extend(chars);
        }
        Self(format!("Command::{titled}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for HandlerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for HandlerId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for HandlerId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Whether an operation may be addressed from outside the handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Public,
    Private,
}

/// Whether an operation is bound to a handler instance. Shared operations
/// exist on the type, not on an instance, and can never be dispatched to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Binding {
    Instance,
    Shared,
}

/// Static descriptor for one operation on a handler type.
///
/// Declared once at handler-definition time; the dispatcher consults these
/// instead of inspecting the handler at run time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperationSpec {
    pub name: &'static str,
    /// Minimum number of positional parameters the operation needs.
    pub min_arity: usize,
    pub visibility: Visibility,
    pub binding: Binding,
    /// Lifecycle entries (`_before`, `_after`, `_remap`) are listed for
    /// completeness; they are never dispatched to directly.
    pub lifecycle: bool,
}

impl OperationSpec {
    pub const fn public(name: &'static str, min_arity: usize) -> Self {
        Self {
            name,
            min_arity,
            visibility: Visibility::Public,
            binding: Binding::Instance,
            lifecycle: false,
        }
    }

    pub const fn private(name: &'static str, min_arity: usize) -> Self {
        Self {
            name,
            min_arity,
            visibility: Visibility::Private,
            binding: Binding::Instance,
            lifecycle: false,
        }
    }

    pub const fn shared(name: &'static str, min_arity: usize) -> Self {
        Self {
            name,
            min_arity,
            visibility: Visibility::Public,
            binding: Binding::Shared,
            lifecycle: false,
        }
    }

    pub const fn lifecycle(name: &'static str) -> Self {
        Self {
            name,
            min_arity: 0,
            visibility: Visibility::Private,
            binding: Binding::Instance,
            lifecycle: true,
        }
    }
}

/// Scoped in-memory sink for everything a handler writes during one
/// invocation. The dispatcher moves the contents into the response's
/// `dispatchOutput` segment on success and drops the buffer on failure;
/// each attempt owns its own buffer, so a failed attempt can never leak
/// partial output into another.
#[derive(Debug, Default)]
pub struct OutputBuffer(String);

impl OutputBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_str(&mut self, text: &str) {
        self.0.push_str(text);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Write for OutputBuffer {
    fn write_str(&mut self, text: &str) -> fmt::Result {
        self.0.push_str(text);
        Ok(())
    }
}

/// Execution context handed to every handler call.
///
/// The request is read-only routing fact; the response takes headers, status
/// and named segments; `out` is the buffered output sink (use `write!` via
/// `std::fmt::Write`).
pub struct Invocation<'a> {
    pub request: &'a Request,
    pub response: &'a mut Response,
    pub out: &'a mut OutputBuffer,
}

/// The unit instantiated to serve a resolved route.
///
/// `invoke` is only called for operations that passed every descriptor
/// check; `before` and `after` bracket both regular and remapped calls.
pub trait Handler {
    /// The handler's callable surface.
    fn operations(&self) -> &'static [OperationSpec];

    /// Run the named operation.
    fn invoke(
        &mut self,
        ctx: &mut Invocation<'_>,
        operation: &str,
        params: &[String],
    ) -> anyhow::Result<()>;

    /// Runs before the operation. A failure here skips the operation and
    /// `after` entirely.
    fn before(&mut self, _ctx: &mut Invocation<'_>) -> anyhow::Result<()> {
        Ok(())
    }

    /// Runs after a successful operation.
    fn after(&mut self, _ctx: &mut Invocation<'_>) -> anyhow::Result<()> {
        Ok(())
    }

    /// Whether this handler defines a remap fallback. Checked before any
    /// lifecycle hook runs, so a handler without one fails fast.
    fn has_remap(&self) -> bool {
        false
    }

    /// Catch-all for operations that did not match a public descriptor.
    /// Receives the originally requested operation name. Only called when
    /// [`Handler::has_remap`] returns true.
    fn remap(
        &mut self,
        _ctx: &mut Invocation<'_>,
        operation: &str,
        _params: &[String],
    ) -> anyhow::Result<()> {
        anyhow::bail!("no remap fallback for operation `{operation}`")
    }
}

/// Construction hook for handlers, fed the resolved request so constructors
/// can enforce invariants before any operation runs.
pub type HandlerFactory = Box<dyn Fn(&Request) -> anyhow::Result<Box<dyn Handler>> + Send + Sync>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_composition_skips_default_module_prefix() {
        let id = HandlerId::compose("Default", "Foo/Bar");
        assert_eq!(id.as_str(), "Foo::Bar");
        let id = HandlerId::compose("Blog", "Foo/Bar");
        assert_eq!(id.as_str(), "Blog::Foo::Bar");
    }

    #[test]
    fn error_handler_identities_are_reserved() {
        assert_eq!(HandlerId::error_handler("Default").as_str(), "Error");
        assert_eq!(HandlerId::error_handler("Blog").as_str(), "Blog::Error");
    }

    #[test]
    fn command_identity_title_cases_the_name() {
        assert_eq!(HandlerId::command("migrate").as_str(), "Command::Migrate");
    }

    #[test]
    fn output_buffer_collects_writes() {
        use std::fmt::Write as _;
        let mut out = OutputBuffer::new();
        assert!(out.is_empty());
        let _ = write!(out, "hello {}", "world");
        assert_eq!(out.as_str(), "hello world");
        assert_eq!(out.len(), 11);
        assert_eq!(out.into_string(), "hello world");
    }
}
