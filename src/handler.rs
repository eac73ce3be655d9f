use crate::endpoint::{Endpoint, SharedEndpoint};
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Clone)]
/// The handler bound to a route.
///
/// A handler is either a callable bound at registration time, or a
/// controller-style string reference (`"PostController.show"`) that is
/// resolved into an endpoint exactly once, during [`crate::Router::prepare`],
/// through the installed [`HandlerResolver`].  Resolving once keeps runtime
/// type probing out of the per-request path.
pub enum Handler {
    /// A bound callable.
    Callable(SharedEndpoint),
    /// A `Controller.action` reference, resolved at prepare time.
    Controller(String),
}

impl Handler {
    /// Wraps an arbitrary endpoint into a callable handler.
    ///
    /// # Examples
    /// ```rust
    /// # use junction::{Handler, Request, Response};
    /// async fn show(_: Request) -> Result<Response, anyhow::Error> {
    ///     Ok(Response::empty_204())
    /// }
    /// let handler = Handler::callable(show);
    /// # drop(handler);
    /// ```
    pub fn callable<E: Endpoint>(endpoint: E) -> Self {
        Handler::Callable(Arc::pin(endpoint))
    }

    /// The controller reference, if this is a controller-style handler.
    pub fn reference(&self) -> Option<&str> {
        match self {
            Handler::Controller(reference) => Some(reference),
            Handler::Callable(_) => None,
        }
    }

    /// A plain-data description of the handler, used by the route-table
    /// inspection API.
    pub(crate) fn describe(&self) -> String {
        match self {
            Handler::Callable(_) => "(callable)".to_owned(),
            Handler::Controller(reference) => reference.clone(),
        }
    }
}

impl std::fmt::Debug for Handler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Handler::Callable(endpoint) => f.debug_tuple("Callable").field(endpoint).finish(),
            Handler::Controller(reference) => {
                f.debug_tuple("Controller").field(reference).finish()
            }
        }
    }
}

/// Conversion into a [`Handler`] at route registration.
///
/// Implemented for string-ish types (producing controller references) and for
/// the endpoint wrappers this crate exposes.  Arbitrary endpoints go through
/// [`Handler::callable`].
pub trait IntoHandler {
    /// Performs the conversion.
    fn into_handler(self) -> Handler;
}

impl IntoHandler for Handler {
    fn into_handler(self) -> Handler {
        self
    }
}

impl IntoHandler for &str {
    fn into_handler(self) -> Handler {
        Handler::Controller(self.to_owned())
    }
}

impl IntoHandler for String {
    fn into_handler(self) -> Handler {
        Handler::Controller(self)
    }
}

impl IntoHandler for SharedEndpoint {
    fn into_handler(self) -> Handler {
        Handler::Callable(self)
    }
}

impl<F> IntoHandler for crate::endpoint::SyncEndpoint<F>
where
    crate::endpoint::SyncEndpoint<F>: Endpoint,
{
    fn into_handler(self) -> Handler {
        Handler::callable(self)
    }
}

impl<F> IntoHandler for crate::endpoint::SimpleEndpoint<F>
where
    crate::endpoint::SimpleEndpoint<F>: Endpoint,
{
    fn into_handler(self) -> Handler {
        Handler::callable(self)
    }
}

/// The seam through which controller-style handler references become
/// invocable endpoints.
///
/// The routing core does not implement dependency lookup itself; whatever
/// owns the controllers installs one of these on the router before
/// [`crate::Router::prepare`] runs.  Every `Controller.action` reference in
/// the route table is passed through [`HandlerResolver::resolve`] exactly
/// once, qualified with the configured handler namespace.
pub trait HandlerResolver: Send + Sync + 'static {
    /// Resolves a fully-qualified handler reference into an endpoint, or
    /// `None` if the reference names nothing.
    fn resolve(&self, reference: &str) -> Option<SharedEndpoint>;
}

#[derive(Default)]
/// A [`HandlerResolver`] backed by a plain map from reference to endpoint.
///
/// # Examples
/// ```rust
/// # use junction::{ControllerMap, Response};
/// let mut controllers = ControllerMap::default();
/// controllers.insert("PostController.index", junction::simple(|| {
///     Response::text("all posts")
/// }));
/// ```
pub struct ControllerMap {
    actions: HashMap<String, SharedEndpoint>,
}

impl ControllerMap {
    /// Binds an endpoint to a handler reference.  Re-inserting the same
    /// reference replaces the previous binding.
    pub fn insert<E: Endpoint>(&mut self, reference: &str, endpoint: E) -> &mut Self {
        self.actions.insert(reference.to_owned(), Arc::pin(endpoint));
        self
    }
}

impl HandlerResolver for ControllerMap {
    fn resolve(&self, reference: &str) -> Option<SharedEndpoint> {
        self.actions.get(reference).cloned()
    }
}

impl std::fmt::Debug for ControllerMap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ControllerMap")
            .field("actions", &self.actions.keys().collect::<Vec<_>>())
            .finish()
    }
}
