mod domain;
mod group;
mod pattern;
mod registry;
mod resource;
mod route;

pub use self::domain::DomainMatcher;
pub use self::group::Group;
pub use self::pattern::Pattern;
pub use self::registry::RouteRegistry;
pub use self::resource::Resource;
pub use self::route::{RouteData, RouteHandle, RouteId, RouteRecord};

use crate::config::RouterConfig;
use crate::error::RouterError;
use crate::handler::{Handler, HandlerResolver, IntoHandler};
use crate::middleware::{Middleware, MiddlewareSet, SharedMiddleware};
use crate::{Request, Response};
use std::collections::HashMap;
use std::sync::Arc;

/// An HTTP router.
///
/// This owns the route table, the named/global middleware tables, and the
/// domain matcher, and drives the whole lifecycle: routes are registered at
/// bootstrap, [`Router::prepare`] compiles and validates the table, and then
/// [`Router::resolve`] / [`Router::handle`] serve requests against an
/// immutable table.
///
/// The resolver scans routes in registration order and the first match wins,
/// so more specific routes must be registered before more general ones:
///
/// ```text
/// GET /user/create -> user_create
/// GET /user/:id    -> user_show
/// ```
///
/// Registered in that order, `/user/create` always reaches `user_create`,
/// even though `/user/:id` could match it too.
///
/// # Examples
/// ```rust
/// # #[tokio::main] async fn main() -> Result<(), anyhow::Error> {
/// let mut router = junction::router();
/// router.get(
///     "/hello/:name",
///     junction::sync(|request: junction::Request| {
///         let name = request.param("name").unwrap_or("world").to_owned();
///         junction::Response::text(format!("hello, {}", name))
///     }),
/// );
/// router.prepare()?;
/// let response = router.handle(junction::Request::get("/hello/there")?).await?;
/// assert_eq!(response.status(), http::StatusCode::OK);
/// # Ok(())
/// # }
/// ```
pub struct Router {
    config: RouterConfig,
    registry: RouteRegistry,
    middleware: MiddlewareSet,
    domains: DomainMatcher,
    resolver: Option<Arc<dyn HandlerResolver>>,
    current_group: Option<String>,
    mounted: bool,
    prepared: bool,
}

#[derive(Debug, Clone)]
/// The result of resolving a request against the route table: which route
/// matched, under which verb, and the parameters extracted from the path.
///
/// A match is allocated fresh per request and attached to the request's
/// extensions; nothing on the shared route record is mutated during
/// resolution.
pub struct RouteMatch {
    /// The id of the matched route.
    pub route: RouteId,
    /// The name of the matched route.
    pub name: String,
    /// The verb the request actually carried; useful when the route answers
    /// several.
    pub verb: http::Method,
    /// The parameters extracted from the path (and the domain, for
    /// domain-bound routes).
    pub params: HashMap<String, String>,
}

impl RouteMatch {
    /// An extracted parameter, by name.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }
}

macro_rules! method {
    ($($(#[$m:meta])* $v:vis fn $n:ident = $meth:expr;)+) => {
        $(
            $(#[$m])* $v fn $n<H: IntoHandler>(&mut self, path: &str, handler: H) -> RouteHandle<'_> {
                self.route(&[$meth], path, handler)
            }
        )+
    };
}

impl Router {
    /// Creates a router with the given configuration.
    pub fn new(config: RouterConfig) -> Self {
        Router {
            config,
            registry: RouteRegistry::new(),
            middleware: MiddlewareSet::new(),
            domains: DomainMatcher::default(),
            resolver: None,
            current_group: None,
            mounted: false,
            prepared: false,
        }
    }

    /// The route registry.
    pub fn registry(&self) -> &RouteRegistry {
        &self.registry
    }

    /// A mutable reference to the route registry, for batch mutation at
    /// bootstrap.
    pub fn registry_mut(&mut self) -> &mut RouteRegistry {
        &mut self.registry
    }

    /// Installs the resolver used to turn `Controller.action` references into
    /// endpoints during [`Router::prepare`].
    pub fn handler_resolver<R: HandlerResolver>(&mut self, resolver: R) -> &mut Self {
        self.resolver = Some(Arc::new(resolver));
        self
    }

    /// Registers a middleware under a short name.  See
    /// [`MiddlewareSet::insert_named`].
    pub fn register_named<M: Middleware>(&mut self, name: &str, middleware: M) -> &mut Self {
        self.middleware.insert_named(name, middleware);
        self
    }

    /// Registers a batch of shared middleware under their names.  See
    /// [`MiddlewareSet::insert_named_all`].
    pub fn register_named_all(&mut self, mapping: Vec<(String, SharedMiddleware)>) -> &mut Self {
        self.middleware.insert_named_all(mapping);
        self
    }

    /// Appends a middleware to the global list.  See
    /// [`MiddlewareSet::register_global`].
    pub fn register_global<M: Middleware>(&mut self, middleware: M) -> &mut Self {
        self.middleware.register_global(middleware);
        self
    }

    /// Appends a batch of shared middleware to the global list, skipping
    /// entries already present.  See [`MiddlewareSet::register_globals`].
    pub fn register_globals(&mut self, batch: Vec<SharedMiddleware>) -> &mut Self {
        self.middleware.register_globals(batch);
        self
    }

    /// The middleware tables.
    pub fn middleware_set(&self) -> &MiddlewareSet {
        &self.middleware
    }

    /// Constructs and appends a route, returning a fluent handle over it.
    /// The route is tagged with the current group, if registration happens
    /// inside a [`Router::group`] closure.
    pub fn register<H: IntoHandler>(
        &mut self,
        path: &str,
        verbs: &[http::Method],
        handler: H,
    ) -> Result<RouteHandle<'_>, RouterError> {
        let group = self.current_group.clone();
        let id = self
            .registry
            .register(path, verbs, handler.into_handler(), group.as_deref())?;
        Ok(RouteHandle::new(&mut self.registry, id))
    }

    /// As [`Router::register`], panicking on an invalid template or an empty
    /// verb set.  Both are configuration errors that would abort startup
    /// anyway; this spelling keeps the fluent registration flow terse.
    pub fn route<H: IntoHandler>(
        &mut self,
        verbs: &[http::Method],
        path: &str,
        handler: H,
    ) -> RouteHandle<'_> {
        match self.register(path, verbs, handler) {
            Ok(handle) => handle,
            Err(error) => panic!("could not register route {:?}: {}", path, error),
        }
    }

    method![
        /// Registers a GET route at the given path.
        ///
        /// # Examples
        /// ```rust
        /// let mut router = junction::router();
        /// router.get("/user/:id", "UserController.show").name("user.show");
        /// ```
        pub fn get = http::Method::GET;
        /// Registers a POST route at the given path.
        pub fn post = http::Method::POST;
        /// Registers a PUT route at the given path.
        pub fn put = http::Method::PUT;
        /// Registers a PATCH route at the given path.
        pub fn patch = http::Method::PATCH;
        /// Registers a DELETE route at the given path.
        pub fn delete = http::Method::DELETE;
        /// Registers a HEAD route at the given path.
        pub fn head = http::Method::HEAD;
    ];

    /// Generates the seven conventional CRUD routes for a resource.  The
    /// handler must be a controller reference; action handlers are derived
    /// from it by name.
    ///
    /// # Examples
    /// ```rust
    /// let mut router = junction::router();
    /// router.resource("post", "PostController").unwrap();
    /// assert_eq!(router.registry().len(), 7);
    /// ```
    pub fn resource<H: IntoHandler>(
        &mut self,
        basename: &str,
        handler: H,
    ) -> Result<Resource<'_>, RouterError> {
        let group = self.current_group.clone();
        Resource::generate(
            &mut self.registry,
            basename,
            handler.into_handler(),
            group.as_deref(),
        )
    }

    /// Runs the given closure with every registered route tagged with the
    /// group's name, returning a batch handle over the routes it registered.
    pub fn group<F: FnOnce(&mut Router)>(&mut self, name: &str, build: F) -> Group<'_> {
        let before = self.registry.len();
        let previous = self.current_group.replace(name.to_owned());
        build(self);
        self.current_group = previous;

        let ids: Vec<RouteId> = self
            .registry
            .iter()
            .skip(before)
            .map(RouteRecord::id)
            .collect();
        Group::new(self, name.to_owned(), ids)
    }

    /// Finalizes the route table.  This must run after registration and
    /// before any request is served: it mounts the configured path prefix,
    /// registers domain patterns with the matcher, validates every named
    /// middleware reference against the named table, and resolves every
    /// controller handler through the installed [`HandlerResolver`] exactly
    /// once.
    ///
    /// Any error here is a configuration error and is expected to abort
    /// application startup.
    pub fn prepare(&mut self) -> Result<(), RouterError> {
        if let Some(prefix) = self.config.mount_prefix.clone() {
            if !self.mounted {
                let ids: Vec<RouteId> = self.registry.iter().map(RouteRecord::id).collect();
                self.registry.prefix(&ids, &prefix)?;
                self.mounted = true;
            }
        }

        let config = &self.config;
        let middleware = &self.middleware;
        let resolver = self.resolver.as_deref();
        let domains = &mut self.domains;

        for record in self.registry.iter_mut() {
            if let Some(domain) = record.domain() {
                domains.add(Pattern::compile(domain)?);
            }

            let resolved = middleware.resolve(record.middleware())?;
            let endpoint = match record.handler() {
                Handler::Callable(endpoint) => endpoint.clone(),
                Handler::Controller(reference) => {
                    let qualified = config.qualify(reference);
                    resolver
                        .and_then(|resolver| resolver.resolve(&qualified))
                        .ok_or(RouterError::UnresolvedHandler(qualified))?
                }
            };
            record.set_resolved(endpoint, resolved);

            log::trace!(
                "route: {:?} {} ({})",
                record.verbs(),
                record.path(),
                record.name()
            );
        }

        self.prepared = true;
        Ok(())
    }

    /// Resolves a path, verb, and host against the route table.
    ///
    /// When the host matches a registered domain pattern, the host is glued
    /// in front of the path so that domain-bound routes can match.  Routes
    /// are scanned in registration order; the first whose pattern and verb
    /// set both match wins.  A miss is `None`, not an error: absence of a
    /// route is a normal outcome, handled by the caller.
    pub fn resolve(
        &self,
        path: &str,
        method: &http::Method,
        host: Option<&str>,
    ) -> Option<RouteMatch> {
        let qualified = host
            .filter(|host| self.domains.matches(host))
            .map(|host| format!("{}{}", host, path));
        let target = qualified.as_deref().unwrap_or(path);

        for record in self.registry.iter() {
            if !record.matches(method) || !record.pattern().is_match(target) {
                continue;
            }
            let params = record.pattern().extract(target).into_iter().collect();
            log::trace!("resolve: {} {} -> {}", method, target, record.name());
            return Some(RouteMatch {
                route: record.id(),
                name: record.name().to_owned(),
                verb: method.clone(),
                params,
            });
        }

        log::trace!("resolve: {} {} -> (no match)", method, target);
        None
    }

    /// Generates a URL from a route name and parameters.
    ///
    /// The name is looked up first (first registered match wins); when no
    /// named route matches, the input is treated as a raw template and
    /// expanded directly.  Note that this fallback means a misspelled name
    /// degrades to best-effort expansion of the literal input rather than
    /// erroring.
    ///
    /// # Examples
    /// ```rust
    /// let mut router = junction::router();
    /// router.get("/user/:id", "UserController.show").name("user.show");
    /// let url = router.url_for("user.show", &[("id", "5")]).unwrap();
    /// assert_eq!(url, "/user/5");
    /// ```
    pub fn url_for(&self, name: &str, params: &[(&str, &str)]) -> Result<String, RouterError> {
        match self.registry.find(|record| record.name() == name) {
            Some(record) => Pattern::expand(record.path(), params),
            None => Pattern::expand(name, params),
        }
    }

    /// The first route satisfying the predicate, as plain data.
    pub fn get_route<P>(&self, predicate: P) -> Option<RouteData>
    where
        P: Fn(&RouteRecord) -> bool,
    {
        self.registry.find(predicate).map(RouteRecord::to_data)
    }

    /// The whole route table as JSON, for diagnostics and testing.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self.registry.to_data()).unwrap_or_default()
    }

    /// Handles a request end to end: resolve, compose the middleware chain,
    /// and run it.  A resolution miss yields an empty `404` response; the
    /// caller decides what a miss means, this just keeps the sentinel out of
    /// the error path.
    pub async fn handle(&self, mut request: Request) -> Result<Response, anyhow::Error> {
        let path = request.uri().path().to_owned();
        let host = request.host().map(str::to_owned);
        let matched = match self.resolve(&path, request.method(), host.as_deref()) {
            Some(matched) => matched,
            None => return Ok(Response::empty_404()),
        };

        let record = self
            .registry
            .get(matched.route)
            .ok_or(RouterError::NotPrepared)?;
        let endpoint = record.endpoint().ok_or(RouterError::NotPrepared)?;
        let chain = self.middleware.compose(record.resolved_middleware(), endpoint);

        request.extensions_mut().insert(matched);
        chain.run(request).await
    }
}

impl Default for Router {
    fn default() -> Self {
        Router::new(RouterConfig::default())
    }
}

impl std::fmt::Debug for Router {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Router")
            .field("registry", &self.registry)
            .field("middleware", &self.middleware)
            .field("domains", &self.domains)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{simple, Handler};

    fn endpoint() -> Handler {
        Handler::callable(simple(Response::empty_204))
    }

    #[test]
    fn test_registration_order_determinism() {
        let mut router = Router::default();
        router.get("/user/create", endpoint()).name("user.create");
        router.get("/user/:id", endpoint()).name("user.show");

        let matched = router
            .resolve("/user/create", &http::Method::GET, None)
            .unwrap();
        assert_eq!(matched.name, "user.create");
        assert!(matched.params.is_empty());

        let matched = router.resolve("/user/5", &http::Method::GET, None).unwrap();
        assert_eq!(matched.name, "user.show");
        assert_eq!(matched.param("id"), Some("5"));
    }

    #[test]
    fn test_multi_verb_routes() {
        let mut router = Router::default();
        router
            .route(&[http::Method::GET, http::Method::HEAD], "/ping", endpoint())
            .name("ping");

        for verb in [http::Method::GET, http::Method::HEAD] {
            let matched = router.resolve("/ping", &verb, None).unwrap();
            assert_eq!(matched.name, "ping");
            assert_eq!(matched.verb, verb);
        }
        assert!(router.resolve("/ping", &http::Method::POST, None).is_none());
    }

    #[test]
    fn test_resolution_miss_is_none() {
        let router = Router::default();
        assert!(router.resolve("/missing", &http::Method::GET, None).is_none());
    }

    #[test]
    fn test_url_round_trip() {
        let mut router = Router::default();
        router.get("/user/:id", endpoint()).name("user.show");

        let url = router.url_for("user.show", &[("id", "5")]).unwrap();
        assert_eq!(url, "/user/5");
        let matched = router.resolve(&url, &http::Method::GET, None).unwrap();
        assert_eq!(matched.name, "user.show");
        assert_eq!(matched.param("id"), Some("5"));
    }

    #[test]
    fn test_url_for_raw_template_fallback() {
        let router = Router::default();
        let url = router.url_for("/thing/:id", &[("id", "9")]).unwrap();
        assert_eq!(url, "/thing/9");
    }

    #[test]
    fn test_url_for_duplicate_names_first_wins() {
        let mut router = Router::default();
        router.get("/first/:id", endpoint()).name("dup");
        router.get("/second/:id", endpoint()).name("dup");
        assert_eq!(router.url_for("dup", &[("id", "1")]).unwrap(), "/first/1");
    }

    #[test]
    fn test_domain_isolation() {
        let mut router = Router::default();
        router.get("/landing", endpoint()).name("landing");
        router
            .get("/dashboard", endpoint())
            .name("admin.dashboard")
            .domain("admin.example.com")
            .unwrap();
        router.prepare().unwrap();

        let matched = router.resolve(
            "/dashboard",
            &http::Method::GET,
            Some("admin.example.com"),
        );
        assert_eq!(matched.unwrap().name, "admin.dashboard");

        // the same path from the bare host reaches nothing
        assert!(router
            .resolve("/dashboard", &http::Method::GET, Some("example.com"))
            .is_none());
        // and the domain route does not leak into host-less resolution
        assert!(router.resolve("/dashboard", &http::Method::GET, None).is_none());
    }

    #[test]
    fn test_domain_params_extracted() {
        let mut router = Router::default();
        router
            .get("/home", endpoint())
            .name("tenant.home")
            .domain(":tenant.example.com")
            .unwrap();
        router.prepare().unwrap();

        let matched = router
            .resolve("/home", &http::Method::GET, Some("acme.example.com"))
            .unwrap();
        assert_eq!(matched.param("tenant"), Some("acme"));
    }

    #[test]
    fn test_group_prefix_and_middleware() {
        let mut router = Router::default();
        router
            .group("admin", |r| {
                r.get("/dashboard", endpoint()).name("admin.dashboard");
                r.get("/settings", endpoint()).name("admin.settings");
            })
            .prefix("admin")
            .unwrap()
            .middleware(&["auth"]);

        let record = router.registry().find(|r| r.name() == "admin.dashboard").unwrap();
        assert_eq!(record.path(), "/admin/dashboard");
        assert_eq!(record.group(), Some("admin"));
        assert_eq!(record.middleware(), ["auth"]);
        assert!(router
            .resolve("/admin/settings", &http::Method::GET, None)
            .is_some());
    }

    #[test]
    fn test_prepare_rejects_unknown_middleware() {
        let mut router = Router::default();
        router.get("/secret", endpoint()).middleware(&["auth:basic"]);
        let result = router.prepare();
        assert!(matches!(
            result,
            Err(RouterError::UnknownMiddleware(name)) if name == "auth"
        ));
    }

    #[test]
    fn test_prepare_rejects_unresolved_controller() {
        let mut router = Router::default();
        router.get("/post", "PostController.index");
        let result = router.prepare();
        assert!(matches!(
            result,
            Err(RouterError::UnresolvedHandler(reference)) if reference == "PostController.index"
        ));
    }

    #[test]
    fn test_mount_prefix() {
        let mut router = Router::new(RouterConfig {
            mount_prefix: Some("api".to_owned()),
            ..Default::default()
        });
        router.get("/user/:id", endpoint()).name("user.show");
        router.prepare().unwrap();
        router.prepare().unwrap(); // mounting is idempotent

        assert!(router.resolve("/api/user/5", &http::Method::GET, None).is_some());
        assert!(router.resolve("/user/5", &http::Method::GET, None).is_none());
    }

    #[test]
    fn test_get_route_and_json() {
        let mut router = Router::default();
        router.get("/user/:id", "UserController.show").name("user.show");

        let data = router.get_route(|r| r.name() == "user.show").unwrap();
        assert_eq!(data.path, "/user/:id");
        assert_eq!(data.handler, "UserController.show");

        let json = router.to_json();
        assert_eq!(json[0]["name"], "user.show");
        assert_eq!(json[0]["verbs"][0], "GET");
    }
}
