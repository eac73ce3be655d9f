#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
/// Errors generated specifically from this library, and not its interactions
/// with user code.
///
/// Every variant here is a configuration error: it is raised while the route
/// table is being built or prepared, and is expected to abort application
/// startup.  A request that matches no route is *not* an error; resolution
/// misses are reported as `None` by [`crate::Router::resolve`].
pub enum RouterError {
    #[error("no middleware registered under the name {0:?}")]
    /// Generated when a route references a named middleware that was never
    /// registered through [`crate::MiddlewareSet::insert_named`].
    UnknownMiddleware(String),
    #[error("resources require a controller reference, got a bound callable for {0:?}")]
    /// Generated when a resource is bound to a callable handler.  Resource
    /// action handlers are derived by appending the action name to the
    /// controller reference, which requires a string handler.
    ResourceHandler(String),
    #[error("member and collection routes require a non-empty path")]
    /// Generated when [`crate::Resource::member`] or
    /// [`crate::Resource::collection`] is given an empty path.
    EmptySubRoutePath,
    #[error("route templates must bind at least one verb")]
    /// Generated when a route is registered with an empty verb set.
    EmptyVerbs,
    #[error("could not compile the route template {template:?}")]
    /// Generated when a route template (or an inline constraint group inside
    /// it) does not produce a valid matcher.
    InvalidTemplate {
        /// The template that failed to compile.
        template: String,
        #[source]
        /// The underlying regex error.
        source: regex::Error,
    },
    #[error("missing parameter {name:?} while expanding {template:?}")]
    /// Generated during reverse URL generation when a required parameter is
    /// absent from the provided parameter list.
    MissingParameter {
        /// The template being expanded.
        template: String,
        /// The parameter that was not provided.
        name: String,
    },
    #[error("could not resolve the handler reference {0:?}")]
    /// Generated during [`crate::Router::prepare`] when a controller-style
    /// handler reference cannot be resolved into an endpoint, either because
    /// no [`crate::HandlerResolver`] was installed or because the resolver
    /// returned nothing for the reference.
    UnresolvedHandler(String),
    #[error("the route table has not been prepared")]
    /// Generated when a request is dispatched before [`crate::Router::prepare`]
    /// has been called.
    NotPrepared,
}
