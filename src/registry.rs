//! Handler identity registry.
//!
//! The registry is the resolver's "does a source exist here?" collaborator
//! and the dispatcher's construction site. Identities come in three shapes:
//! constructible handlers with a factory, discovered sources with no bound
//! type, and sources whose type is not a handler. The resolver treats all
//! three as locatable; only the dispatcher tells them apart.

use crate::handler::{Handler, HandlerFactory, HandlerId};
use crate::http::Request;
use std::collections::HashMap;
use tracing::warn;

/// The class-loading collaborator boundary: the resolver's longest-prefix
/// search asks this one question per candidate identity.
pub trait HandlerLocator {
    fn locate(&self, id: &HandlerId) -> bool;
}

enum Entry {
    Constructible(HandlerFactory),
    SourceOnly,
    Foreign,
}

/// What the dispatcher finds when it probes an identity it is about to
/// construct.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Probe {
    /// No factory bound (unknown identity, or a declared source with no
    /// handler type behind it).
    Missing,
    /// The bound type does not implement the handler capability.
    Foreign,
    Constructible,
}

#[derive(Default)]
pub struct HandlerRegistry {
    entries: HashMap<HandlerId, Entry>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a constructible handler under `id`. Re-registering an identity
    /// replaces the previous binding.
    pub fn register<F>(&mut self, id: impl Into<HandlerId>, factory: F) -> &mut Self
    where
        F: Fn(&Request) -> anyhow::Result<Box<dyn Handler>> + Send + Sync + 'static,
    {
        let id = id.into();
        if self.entries.contains_key(&id) {
            warn!(handler = %id, "replacing existing handler registration");
        }
        self.entries
            .insert(id, Entry::Constructible(Box::new(factory)));
        self
    }

    /// Declare that a source exists for `id` without binding a handler type.
    /// Dispatching to it fails with `HandlerTypeMissing`.
    pub fn declare_source(&mut self, id: impl Into<HandlerId>) -> &mut Self {
        self.entries.insert(id.into(), Entry::SourceOnly);
        self
    }

    /// Declare that the type behind `id` is not a handler. Dispatching to it
    /// fails with `NotAHandler`.
    pub fn declare_foreign(&mut self, id: impl Into<HandlerId>) -> &mut Self {
        self.entries.insert(id.into(), Entry::Foreign);
        self
    }

    pub fn contains(&self, id: &HandlerId) -> bool {
        self.entries.contains_key(id)
    }

    pub fn probe(&self, id: &HandlerId) -> Probe {
        match self.entries.get(id) {
            Some(Entry::Constructible(_)) => Probe::Constructible,
            Some(Entry::Foreign) => Probe::Foreign,
            Some(Entry::SourceOnly) | None => Probe::Missing,
        }
    }

    /// Run the factory bound to `id`. `None` when the identity has no
    /// factory; the constructor's own failure is passed through.
    pub fn construct(
        &self,
        id: &HandlerId,
        request: &Request,
    ) -> Option<anyhow::Result<Box<dyn Handler>>> {
        match self.entries.get(id) {
            Some(Entry::Constructible(factory)) => Some(factory(request)),
            _ => None,
        }
    }
}

impl HandlerLocator for HandlerRegistry {
    fn locate(&self, id: &HandlerId) -> bool {
        self.entries.contains_key(id)
    }
}
