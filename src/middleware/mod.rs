//! Middleware composition.
//!
//! Middleware sits between the incoming request and the route's endpoint.  A
//! chain is built per request from the global middleware list followed by the
//! route's named middleware references, in registration order; the first
//! middleware in the list is the outermost layer of the onion, executing
//! first on the way in and last on the way out.  A middleware that never
//! calls [`Next::apply`] short-circuits the chain.
//!
//! Named middleware is referenced with an `name:arg1,arg2` key: the base key
//! is looked up in the named table (an unknown key is a configuration error),
//! and everything after the `:` is split on `,` into bound parameters handed
//! to the middleware on every invocation.

mod trace;

pub use self::trace::TraceMiddleware;
use crate::endpoint::{Endpoint, SharedEndpoint};
use crate::error::RouterError;
use crate::{Request, Response};
use std::collections::HashMap;
use std::fmt::Debug;
use std::pin::Pin;
use std::sync::Arc;

/// A reference-counted, pinned middleware, shared between the named table and
/// every in-flight request.
pub type SharedMiddleware = Pin<Arc<dyn Middleware>>;

#[async_trait]
/// An HTTP request/response modifier.
///
/// This sits between the raw request and response and the endpoint, allowing
/// custom functions to mutate either before being passed on.  A typical
/// middleware will take the incoming [`Request`], potentially modify it,
/// before calling [`Next::apply`] with the modified request; then, take the
/// resulting [`Response`], potentially modifying it, before returning.
/// However, since every layer of the stack is fallible, it must be able to
/// handle errors.
///
/// `params` carries the parameters bound to this middleware at registration
/// time (the `basic,jwt` in `auth:basic,jwt`); it is empty for global
/// middleware and for named references without a parameter segment.
pub trait Middleware: Debug + Send + Sync + 'static {
    #[must_use]
    /// Handles the given request, returning a response.  The next parameter
    /// contains the information on how to process everything after the
    /// current middleware, i.e. generating a response from the endpoint.
    async fn apply(
        self: Pin<&Self>,
        request: Request,
        next: Next<'_>,
        params: &[String],
    ) -> Result<Response, anyhow::Error>;
}

#[derive(Clone)]
/// A middleware paired with its bound parameters, ready to take its place in
/// a chain.
pub struct ResolvedMiddleware {
    middleware: SharedMiddleware,
    params: Arc<[String]>,
}

impl ResolvedMiddleware {
    fn new(middleware: SharedMiddleware, params: Vec<String>) -> Self {
        ResolvedMiddleware {
            middleware,
            params: params.into(),
        }
    }
}

impl Debug for ResolvedMiddleware {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolvedMiddleware")
            .field("middleware", &self.middleware)
            .field("params", &self.params)
            .finish()
    }
}

#[derive(Copy, Clone, Debug)]
/// The next item(s) in the chain.
///
/// This borrows from the chain itself, and so the lifetime here exceeds the
/// lifetime of the request (but is not `'static`).  This contains a reference
/// to the eventual endpoint, as well as any (remaining) middleware that must
/// happen next.
pub struct Next<'a> {
    middleware: &'a [ResolvedMiddleware],
    endpoint: Pin<&'a dyn Endpoint>,
}

impl<'a> Next<'a> {
    pub(crate) fn new(
        middleware: &'a [ResolvedMiddleware],
        endpoint: Pin<&'a dyn Endpoint>,
    ) -> Self {
        Next {
            middleware,
            endpoint,
        }
    }

    /// This causes all of the remaining middleware and endpoint to be run,
    /// from this point; i.e., if there is any remaining middleware, execute
    /// that (passing in a modified version of this struct); otherwise, execute
    /// the endpoint.
    ///
    /// It is valid behavior to not call this function; not calling this
    /// function means interrupting the chain, and none of the remaining
    /// middleware nor the endpoint will be run.  This could be useful for
    /// e.g. rejecting unauthenticated requests.
    pub async fn apply(self, request: Request) -> Result<Response, anyhow::Error> {
        if let Some((current, rest)) = self.middleware.split_first() {
            let next = Next {
                middleware: rest,
                endpoint: self.endpoint,
            };
            current
                .middleware
                .as_ref()
                .apply(request, next, &current.params)
                .await
        } else {
            self.endpoint.apply(request).await
        }
    }
}

#[derive(Debug)]
/// A fully composed invocation chain: an ordered middleware list around a
/// terminal endpoint.
///
/// Chains are cheap to build (every entry is a shared handle) and are
/// constructed fresh per request; nothing in a running chain mutates the
/// shared route table.
pub struct Chain {
    entries: Vec<ResolvedMiddleware>,
    endpoint: SharedEndpoint,
}

impl Chain {
    /// Runs the chain against the given request.  The outermost middleware is
    /// the first entry of the list; the endpoint runs innermost.
    pub async fn run(&self, request: Request) -> Result<Response, anyhow::Error> {
        Next::new(&self.entries, self.endpoint.as_ref())
            .apply(request)
            .await
    }

    /// The number of middleware layers in the chain.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the chain consists of the bare endpoint.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// The named-middleware table and the global middleware list.
///
/// Both are populated at bootstrap and read-only while requests are being
/// served.
pub struct MiddlewareSet {
    named: HashMap<String, SharedMiddleware>,
    global: Vec<SharedMiddleware>,
}

impl MiddlewareSet {
    pub(crate) fn new() -> Self {
        MiddlewareSet {
            named: HashMap::new(),
            global: vec![],
        }
    }

    /// Registers a middleware under a short name, making it referenceable
    /// from routes as `name` or `name:arg1,arg2`.  Re-registering a name
    /// replaces the previous entry.
    pub fn insert_named<M: Middleware>(&mut self, name: &str, middleware: M) -> &mut Self {
        self.named.insert(name.to_owned(), Arc::pin(middleware));
        self
    }

    /// Registers a batch of shared middleware under their names.
    /// Conflicting names are replaced, last entry wins.
    pub fn insert_named_all(&mut self, mapping: Vec<(String, SharedMiddleware)>) -> &mut Self {
        for (name, middleware) in mapping {
            self.named.insert(name, middleware);
        }
        self
    }

    /// Appends a middleware to the global list, applied to every route ahead
    /// of its named middleware.
    pub fn register_global<M: Middleware>(&mut self, middleware: M) -> &mut Self {
        self.global.push(Arc::pin(middleware));
        self
    }

    /// Appends a batch of shared middleware to the global list, skipping any
    /// entry that is already registered.  Re-registering the same batch is
    /// idempotent.
    pub fn register_globals(&mut self, batch: Vec<SharedMiddleware>) -> &mut Self {
        for middleware in batch {
            let present = self
                .global
                .iter()
                .any(|existing| same_middleware(existing, &middleware));
            if !present {
                self.global.push(middleware);
            }
        }
        self
    }

    /// Whether a middleware is registered under the given base name.
    pub fn contains(&self, name: &str) -> bool {
        self.named.contains_key(name)
    }

    /// Resolves a list of raw middleware keys against the named table.  Fails
    /// with [`RouterError::UnknownMiddleware`] on the first key whose base
    /// name is not registered.
    pub fn resolve(&self, keys: &[String]) -> Result<Vec<ResolvedMiddleware>, RouterError> {
        keys.iter()
            .map(|key| {
                let (base, params) = parse_key(key);
                let middleware = self
                    .named
                    .get(base)
                    .cloned()
                    .ok_or_else(|| RouterError::UnknownMiddleware(base.to_owned()))?;
                Ok(ResolvedMiddleware::new(middleware, params))
            })
            .collect()
    }

    /// Composes the global list and the given pre-resolved route middleware
    /// around a terminal endpoint.
    pub fn compose(&self, route: &[ResolvedMiddleware], endpoint: &SharedEndpoint) -> Chain {
        let entries = self
            .global
            .iter()
            .map(|middleware| ResolvedMiddleware::new(middleware.clone(), vec![]))
            .chain(route.iter().cloned())
            .collect();
        Chain {
            entries,
            endpoint: endpoint.clone(),
        }
    }
}

impl Debug for MiddlewareSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MiddlewareSet")
            .field("named", &self.named.keys().collect::<Vec<_>>())
            .field("global", &self.global.len())
            .finish()
    }
}

/// Wraps a middleware into a shared handle, for
/// [`MiddlewareSet::register_globals`].
pub fn shared<M: Middleware>(middleware: M) -> SharedMiddleware {
    Arc::pin(middleware)
}

// Identity comparison over the data pointer; two handles are the same entry
// iff they share an allocation.
fn same_middleware(a: &SharedMiddleware, b: &SharedMiddleware) -> bool {
    std::ptr::eq(
        &**a as *const dyn Middleware as *const (),
        &**b as *const dyn Middleware as *const (),
    )
}

/// Splits a raw middleware key into its base name and bound parameters.
///
/// `"auth:basic,jwt"` becomes `("auth", ["basic", "jwt"])`; a key without a
/// `:` segment carries no parameters.
pub(crate) fn parse_key(raw: &str) -> (&str, Vec<String>) {
    match raw.split_once(':') {
        Some((base, rest)) => {
            let params = rest
                .split(',')
                .map(str::trim)
                .filter(|param| !param.is_empty())
                .map(str::to_owned)
                .collect();
            (base, params)
        }
        None => (raw, vec![]),
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[derive(Debug)]
    struct NoopMiddleware;

    #[async_trait]
    impl Middleware for NoopMiddleware {
        async fn apply(
            self: Pin<&Self>,
            request: Request,
            next: Next<'_>,
            _params: &[String],
        ) -> Result<Response, anyhow::Error> {
            next.apply(request).await
        }
    }

    #[test]
    fn test_parse_key() {
        assert_eq!(parse_key("auth"), ("auth", vec![]));
        assert_eq!(
            parse_key("auth:basic,jwt"),
            ("auth", vec!["basic".to_owned(), "jwt".to_owned()])
        );
        assert_eq!(parse_key("auth:"), ("auth", vec![]));
    }

    #[test]
    fn test_resolve_unknown() {
        let set = MiddlewareSet::new();
        let result = set.resolve(&["auth:basic".to_owned()]);
        assert!(matches!(
            result,
            Err(RouterError::UnknownMiddleware(name)) if name == "auth"
        ));
    }

    #[test]
    fn test_resolve_params() {
        let mut set = MiddlewareSet::new();
        set.insert_named("auth", NoopMiddleware);
        let resolved = set.resolve(&["auth:basic,jwt".to_owned()]).unwrap();
        assert_eq!(resolved.len(), 1);
        assert_eq!(&resolved[0].params[..], ["basic", "jwt"]);
    }

    #[test]
    fn test_global_batch_dedup() {
        let mut set = MiddlewareSet::new();
        let first = shared(NoopMiddleware);
        let second = shared(NoopMiddleware);
        set.register_globals(vec![first.clone(), second.clone()]);
        assert_eq!(set.global.len(), 2);
        // same handles again, nothing appended
        set.register_globals(vec![first, second]);
        assert_eq!(set.global.len(), 2);
        // a fresh allocation is a new entry
        set.register_globals(vec![shared(NoopMiddleware)]);
        assert_eq!(set.global.len(), 3);
    }
}
