use super::route::RouteId;
use super::Router;
use crate::error::RouterError;

/// A batch handle over the routes registered inside a group closure.
///
/// Returned by [`Router::group`].  Every route registered while the closure
/// ran is tagged with the group's name and collected here; the batch methods
/// then mutate all of them through the shared registry at once.  The group
/// tag itself is only meaningful at construction time; resolution never
/// consults it.
///
/// # Examples
/// ```rust
/// let mut router = junction::router();
/// router
///     .group("admin", |r| {
///         r.get("/dashboard", "AdminController.dashboard");
///         r.get("/settings", "AdminController.settings");
///     })
///     .prefix("admin")
///     .unwrap()
///     .middleware(&["auth:admin"]);
/// ```
#[derive(Debug)]
pub struct Group<'r> {
    router: &'r mut Router,
    name: String,
    ids: Vec<RouteId>,
}

impl<'r> Group<'r> {
    pub(crate) fn new(router: &'r mut Router, name: String, ids: Vec<RouteId>) -> Self {
        Group { router, name, ids }
    }

    /// The group's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The ids of the routes registered under this group.
    pub fn ids(&self) -> &[RouteId] {
        &self.ids
    }

    /// Prepends a path segment to every route in the group, recompiling each
    /// pattern.
    pub fn prefix(&mut self, segment: &str) -> Result<&mut Self, RouterError> {
        self.router.registry_mut().prefix(&self.ids, segment)?;
        Ok(self)
    }

    /// Binds every route in the group to a domain pattern.
    pub fn domain(&mut self, domain: &str) -> Result<&mut Self, RouterError> {
        self.router.registry_mut().tag_domain(&self.ids, domain)?;
        Ok(self)
    }

    /// Appends named-middleware keys to every route in the group.
    pub fn middleware<S: AsRef<str>>(&mut self, keys: &[S]) -> &mut Self {
        self.router.registry_mut().append_middleware(&self.ids, keys);
        self
    }
}
