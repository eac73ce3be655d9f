use super::pattern::Pattern;
use super::registry::RouteRegistry;
use crate::error::RouterError;
use crate::handler::Handler;
use crate::middleware::ResolvedMiddleware;
use crate::SharedEndpoint;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// A stable identifier for a route record.
///
/// Resources and groups hold ids into the shared registry rather than copies
/// of the records, so batch mutation always acts on the registry's single
/// authoritative view.
pub struct RouteId(pub(crate) u64);

/// One registered endpoint: a path template, the verbs it answers, its
/// handler, and the compiled pattern the resolver tests against.
///
/// The compiled pattern is kept in sync with the template and domain by every
/// mutation helper; a record is never resolvable with a stale pattern.
pub struct RouteRecord {
    id: RouteId,
    path: String,
    verbs: Vec<http::Method>,
    handler: Handler,
    pattern: Pattern,
    middleware: Vec<String>,
    name: String,
    group: Option<String>,
    domain: Option<String>,
    // filled in by Router::prepare
    endpoint: Option<SharedEndpoint>,
    resolved_middleware: Vec<ResolvedMiddleware>,
}

#[derive(Debug, Clone, Serialize)]
/// A plain-data view of a route record, for diagnostics and testing.
pub struct RouteData {
    /// The raw path template.
    pub path: String,
    /// The verbs the route answers.
    pub verbs: Vec<String>,
    /// The handler, as a controller reference or `"(callable)"`.
    pub handler: String,
    /// The raw named-middleware keys attached to the route.
    pub middleware: Vec<String>,
    /// The route's name.
    pub name: String,
    /// The group the route was registered under, if any.
    pub group: Option<String>,
    /// The domain pattern the route is bound to, if any.
    pub domain: Option<String>,
}

impl RouteRecord {
    pub(crate) fn new(
        id: RouteId,
        path: String,
        verbs: Vec<http::Method>,
        handler: Handler,
        group: Option<String>,
    ) -> Result<Self, RouterError> {
        let pattern = Pattern::compile(&path)?;
        Ok(RouteRecord {
            id,
            name: path.clone(),
            path,
            verbs,
            handler,
            pattern,
            middleware: vec![],
            group,
            domain: None,
            endpoint: None,
            resolved_middleware: vec![],
        })
    }

    /// The record's identifier.
    pub fn id(&self) -> RouteId {
        self.id
    }

    /// The raw path template, without any domain qualification.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The verbs this route answers.
    pub fn verbs(&self) -> &[http::Method] {
        &self.verbs
    }

    /// The route's handler.
    pub fn handler(&self) -> &Handler {
        &self.handler
    }

    /// The compiled pattern, domain-qualified when a domain is set.
    pub fn pattern(&self) -> &Pattern {
        &self.pattern
    }

    /// The raw named-middleware keys attached to the route, in order.
    pub fn middleware(&self) -> &[String] {
        &self.middleware
    }

    /// The route's name, used for reverse URL lookup.  Defaults to the path
    /// template as it was registered.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The group this route was registered under, if any.
    pub fn group(&self) -> Option<&str> {
        self.group.as_deref()
    }

    /// The domain pattern this route is bound to, if any.
    pub fn domain(&self) -> Option<&str> {
        self.domain.as_deref()
    }

    /// Whether this route answers the given verb.
    pub fn matches(&self, method: &http::Method) -> bool {
        self.verbs.contains(method)
    }

    /// The endpoint resolved during [`crate::Router::prepare`], if prepare
    /// has run.
    pub fn endpoint(&self) -> Option<&SharedEndpoint> {
        self.endpoint.as_ref()
    }

    pub(crate) fn resolved_middleware(&self) -> &[ResolvedMiddleware] {
        &self.resolved_middleware
    }

    pub(crate) fn set_name(&mut self, name: &str) {
        self.name = name.to_owned();
    }

    pub(crate) fn push_middleware<S: AsRef<str>>(&mut self, keys: &[S]) {
        self.middleware
            .extend(keys.iter().map(|key| key.as_ref().to_owned()));
    }

    pub(crate) fn set_domain(&mut self, domain: &str) -> Result<(), RouterError> {
        self.domain = Some(domain.to_owned());
        self.recompile()
    }

    pub(crate) fn set_path(&mut self, path: String) -> Result<(), RouterError> {
        self.path = path;
        self.recompile()
    }

    /// Appends a synthetic `:format(...)` parameter to the template.  With
    /// `strict` set the suffix is required and the bare path no longer
    /// matches; otherwise the suffix is optional.
    pub(crate) fn add_formats(
        &mut self,
        extensions: &[&str],
        strict: bool,
    ) -> Result<(), RouterError> {
        let group = extensions
            .iter()
            .map(|ext| format!(".{}", ext.trim_start_matches('.')))
            .collect::<Vec<_>>()
            .join("|");
        self.path.push_str(&format!(":format({})", group));
        if !strict {
            self.path.push('?');
        }
        self.recompile()
    }

    pub(crate) fn set_resolved(
        &mut self,
        endpoint: SharedEndpoint,
        middleware: Vec<ResolvedMiddleware>,
    ) {
        self.endpoint = Some(endpoint);
        self.resolved_middleware = middleware;
    }

    /// The template the resolver actually matches against: the domain
    /// pattern, when present, glued in front of the path template.
    pub(crate) fn effective_template(&self) -> String {
        match &self.domain {
            Some(domain) => format!("{}{}", domain, self.path),
            None => self.path.clone(),
        }
    }

    fn recompile(&mut self) -> Result<(), RouterError> {
        self.pattern = Pattern::compile(&self.effective_template())?;
        Ok(())
    }

    /// The plain-data view of the record.
    pub fn to_data(&self) -> RouteData {
        RouteData {
            path: self.path.clone(),
            verbs: self.verbs.iter().map(|verb| verb.to_string()).collect(),
            handler: self.handler.describe(),
            middleware: self.middleware.clone(),
            name: self.name.clone(),
            group: self.group.clone(),
            domain: self.domain.clone(),
        }
    }
}

impl std::fmt::Debug for RouteRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouteRecord")
            .field("path", &self.path)
            .field("verbs", &self.verbs)
            .field("name", &self.name)
            .field("domain", &self.domain)
            .finish_non_exhaustive()
    }
}

/// A fluent handle over the route that was just registered.
///
/// Returned by the registration methods on [`crate::Router`]; annotating
/// calls act on that single record in the registry.
///
/// # Examples
/// ```rust
/// let mut router = junction::router();
/// router
///     .get("/user/:id", "UserController.show")
///     .name("user.show")
///     .middleware(&["auth:basic"]);
/// ```
#[derive(Debug)]
pub struct RouteHandle<'r> {
    registry: &'r mut RouteRegistry,
    id: RouteId,
}

impl<'r> RouteHandle<'r> {
    pub(crate) fn new(registry: &'r mut RouteRegistry, id: RouteId) -> Self {
        RouteHandle { registry, id }
    }

    /// The id of the underlying record.
    pub fn id(&self) -> RouteId {
        self.id
    }

    /// Names the route for reverse URL lookup, replacing the default (the
    /// path template).
    pub fn name(&mut self, name: &str) -> &mut Self {
        if let Some(record) = self.registry.get_mut(self.id) {
            record.set_name(name);
        }
        self
    }

    /// Appends named-middleware keys to the route, preserving order.
    pub fn middleware<S: AsRef<str>>(&mut self, keys: &[S]) -> &mut Self {
        if let Some(record) = self.registry.get_mut(self.id) {
            record.push_middleware(keys);
        }
        self
    }

    /// Appends a format suffix to the route.  See
    /// [`crate::RouteRegistry::add_formats`].
    pub fn formats(&mut self, extensions: &[&str], strict: bool) -> Result<&mut Self, RouterError> {
        self.registry.add_formats(self.id, extensions, strict)?;
        Ok(self)
    }

    /// Binds the route to a domain pattern.
    pub fn domain(&mut self, domain: &str) -> Result<&mut Self, RouterError> {
        self.registry.tag_domain(&[self.id], domain)?;
        Ok(self)
    }
}
