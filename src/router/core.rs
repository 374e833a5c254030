use crate::handler::HandlerId;
use crate::registry::HandlerLocator;
use regex::Regex;
use smallvec::SmallVec;
use std::collections::HashMap;
use tracing::{debug, info, warn};

/// Module name assumed when no registered alias matches the first path
/// segment. Handler identities under this module carry no prefix.
pub const DEFAULT_MODULE: &str = "Default";

/// Params stored inline before spilling to the heap.
pub const MAX_INLINE_PARAMS: usize = 8;

/// Stack-allocated storage for positional operation parameters.
pub type ParamVec = SmallVec<[String; MAX_INLINE_PARAMS]>;

/// A user-declared rewrite rule. `:num` and `:any` placeholders compile to
/// `[0-9]+` and `.+`; the pattern is anchored over the whole path.
#[derive(Debug, Clone)]
struct RouteRule {
    name: String,
    source: String,
    destination: String,
}

/// The routing facts for one successfully resolved path. Immutable once
/// produced; the dispatcher reads it, it never reshapes it.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedRoute {
    pub module: String,
    pub handler_id: HandlerId,
    pub operation: String,
    pub params: ParamVec,
}

/// Outcome of path resolution. The concerned module is reported even when no
/// handler was found, so the escalation pipeline can still probe that
/// module's error handler.
#[derive(Debug)]
pub struct Resolution {
    pub module: String,
    pub route: Option<ResolvedRoute>,
    /// Effective path produced by the first matching rewrite rule, if any.
    pub rewritten: Option<String>,
}

/// Route table and module alias map.
///
/// Rules keep declaration order; an exact (non-pattern) match over the whole
/// table always beats a pattern match, and within the pattern scan the first
/// declared match wins.
#[derive(Debug, Default)]
pub struct Router {
    rules: Vec<RouteRule>,
    modules: HashMap<String, String>,
}

impl Router {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a rewrite rule. Re-declaring a source replaces its
    /// destination in place, keeping the original position in the scan
    /// order.
    pub fn add_route(
        &mut self,
        name: impl Into<String>,
        source: impl Into<String>,
        destination: impl Into<String>,
    ) -> &mut Self {
        let name = name.into();
        let source = source.into();
        let destination = destination.into();
        match self.rules.iter_mut().find(|rule| rule.source == source) {
            Some(rule) => {
                rule.name = name;
                rule.destination = destination;
            }
            None => self.rules.push(RouteRule {
                name,
                source,
                destination,
            }),
        }
        self
    }

    /// Map a URL alias onto a module name. Last write per alias wins.
    pub fn register_module(
        &mut self,
        module: impl Into<String>,
        alias: impl Into<String>,
    ) -> &mut Self {
        self.modules.insert(alias.into(), module.into());
        self
    }

    /// Resolve a raw request path to a handler identity, operation and
    /// params, probing `locator` for handler existence.
    pub fn resolve(&self, raw_path: &str, locator: &dyn HandlerLocator) -> Resolution {
        let requested = normalize(raw_path);
        debug!(path = %requested, "resolving request path");

        let rewritten = self.rewrite(&requested);
        let effective = rewritten.as_deref().unwrap_or(&requested);

        // Alias resolution always precedes handler resolution: a module
        // alias on the first segment shadows any same-named handler in the
        // default module.
        let (first, rest) = match effective.split_once('/') {
            Some((first, rest)) => (first, Some(rest)),
            None => (effective, None),
        };
        let (module, module_path) = match self.modules.get(first) {
            Some(module) => (module.as_str(), rest.unwrap_or("")),
            None => (DEFAULT_MODULE, effective),
        };

        let route = self.find_handler(module, module_path, locator);
        match &route {
            Some(found) => {
                info!(
                    module = %found.module,
                    handler = %found.handler_id,
                    operation = %found.operation,
                    params = found.params.len(),
                    "path resolved"
                );
            }
            None => {
                warn!(module = %module, path = %requested, "no handler found for request path");
            }
        }

        Resolution {
            module: module.to_string(),
            route,
            rewritten,
        }
    }

    /// First pass of resolution: run the request path through the route
    /// table. Exact sources are checked over the whole table before any
    /// pattern is tried.
    fn rewrite(&self, path: &str) -> Option<String> {
        if let Some(rule) = self.rules.iter().find(|rule| rule.source == path) {
            debug!(rule = %rule.name, destination = %rule.destination, "exact route rule fired");
            return Some(rule.destination.clone());
        }

        for rule in &self.rules {
            let pattern = rule
                .source
                .replace(":num", "[0-9]+")
                .replace(":any", ".+");
            let anchored = format!("^{pattern}$");
            let regex = match Regex::new(&anchored) {
                Ok(regex) => regex,
                Err(err) => {
                    warn!(rule = %rule.name, error = %err, "skipping route rule with malformed pattern");
                    continue;
                }
            };
            if regex.is_match(path) {
                // Back-reference substitution only when the rule opts in on
                // both sides.
                let destination = if rule.destination.contains('$') && rule.source.contains('(') {
                    regex.replace(path, rule.destination.as_str()).into_owned()
                } else {
                    rule.destination.clone()
                };
                debug!(rule = %rule.name, destination = %destination, "wildcard route rule fired");
                return Some(destination);
            }
        }
        None
    }

    /// Longest-prefix search: title-case the module-relative path, then
    /// probe the locator with ever-shorter prefixes until one names an
    /// existing handler. The remainder splits into operation and params.
    fn find_handler(
        &self,
        module: &str,
        module_path: &str,
        locator: &dyn HandlerLocator,
    ) -> Option<ResolvedRoute> {
        let module_path = if module_path.is_empty() {
            "root"
        } else {
            module_path
        };
        let canonical = title_case_segments(module_path);

        let mut candidate: &str = &canonical;
        loop {
            let id = HandlerId::compose(module, candidate);
            debug!(candidate = %id, "probing handler identity");
            if locator.locate(&id) {
                // The remainder is taken from the lower-cased path, so the
                // operation and params keep their requested form.
                let remainder = module_path.get(candidate.len() + 1..).unwrap_or("");
                let (operation, params) = split_operation(remainder);
                return Some(ResolvedRoute {
                    module: module.to_string(),
                    handler_id: id,
                    operation,
                    params,
                });
            }
            match candidate.rfind('/') {
                Some(cut) => candidate = &candidate[..cut],
                None => break,
            }
        }
        None
    }
}

/// Lower-case the raw path, trim leading separators, and strip a single
/// trailing separator.
fn normalize(raw: &str) -> String {
    let lowered = raw.to_ascii_lowercase();
    let trimmed = lowered.trim_start_matches('/');
    trimmed.strip_suffix('/').unwrap_or(trimmed).to_string()
}

/// Upper-case the first character and every character following a `/`.
/// ASCII-only, mirroring the lower-casing in [`normalize`]; byte length is
/// preserved so prefix offsets computed on the canonical form apply to the
/// requested form.
fn title_case_segments(path: &str) -> String {
    let mut out = String::with_capacity(path.len());
    let mut upper_next = true;
    for ch in path.chars() {
        if upper_next {
            out.push(ch.to_ascii_uppercase());
        } else {
            out.push(ch);
        }
        upper_next = ch == '/';
    }
    out
}

/// Split the post-prefix remainder: first segment is the operation
/// (defaulting to `index`), the rest are positional params.
fn split_operation(remainder: &str) -> (String, ParamVec) {
    if remainder.is_empty() {
        return ("index".to_string(), ParamVec::new());
    }
    match remainder.split_once('/') {
        None => (remainder.to_string(), ParamVec::new()),
        Some((operation, rest)) => (
            operation.to_string(),
            rest.split('/').map(str::to_string).collect(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_strips_one_trailing_separator() {
        assert_eq!(normalize("/Pages/About/"), "pages/about");
        assert_eq!(normalize("//pages"), "pages");
        assert_eq!(normalize("/"), "");
    }

    #[test]
    fn title_casing_follows_separators() {
        assert_eq!(title_case_segments("foo/apple/pie"), "Foo/Apple/Pie");
        assert_eq!(title_case_segments("root"), "Root");
    }

    #[test]
    fn remainder_splits_into_operation_and_params() {
        let (op, params) = split_operation("");
        assert_eq!(op, "index");
        assert!(params.is_empty());

        let (op, params) = split_operation("show");
        assert_eq!(op, "show");
        assert!(params.is_empty());

        let (op, params) = split_operation("show/42/full");
        assert_eq!(op, "show");
        assert_eq!(params.as_slice(), ["42".to_string(), "full".to_string()]);
    }

    #[test]
    fn empty_segments_between_separators_become_empty_params() {
        let (op, params) = split_operation("show//42");
        assert_eq!(op, "show");
        assert_eq!(params.as_slice(), ["".to_string(), "42".to_string()]);
    }
}
