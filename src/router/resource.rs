use super::registry::{join_paths, RouteRegistry};
use super::route::RouteId;
use crate::error::RouterError;
use crate::handler::Handler;

/// The seven conventional CRUD actions, in generation order.
fn actions() -> [(&'static str, Vec<http::Method>, &'static str); 7] {
    use http::Method;
    [
        ("index", vec![Method::GET, Method::HEAD], ""),
        ("create", vec![Method::GET, Method::HEAD], "/create"),
        ("store", vec![Method::POST], ""),
        ("show", vec![Method::GET, Method::HEAD], "/:id"),
        ("edit", vec![Method::GET, Method::HEAD], "/:id/edit"),
        ("update", vec![Method::PUT, Method::PATCH], "/:id"),
        ("destroy", vec![Method::DELETE], "/:id"),
    ]
}

/// A conventionally-named bundle of CRUD routes generated from one base name
/// and one controller.
///
/// Generating a resource registers the seven standard actions; the returned
/// builder then lets you filter (`only`/`except`), extend (`member`/
/// `collection`), attach middleware, or rename individual actions.  The
/// builder holds ids into the shared registry, so every mutation acts on the
/// same records the resolver will scan.
///
/// A dotted base name nests the resource: `post.comment` generates routes
/// under `/post/:post_id/comment`, named `post.comment.index` and so on.
///
/// # Examples
/// ```rust
/// let mut router = junction::router();
/// router
///     .resource("post", "PostController")
///     .unwrap()
///     .except(&["destroy"])
///     .middleware(&["auth"]);
/// ```
#[derive(Debug)]
pub struct Resource<'r> {
    registry: &'r mut RouteRegistry,
    controller: String,
    name_base: String,
    base_path: String,
    routes: Vec<(String, RouteId)>,
}

impl<'r> Resource<'r> {
    pub(crate) fn generate(
        registry: &'r mut RouteRegistry,
        basename: &str,
        handler: Handler,
        group: Option<&str>,
    ) -> Result<Self, RouterError> {
        let controller = match handler {
            Handler::Controller(reference) => reference,
            Handler::Callable(_) => return Err(RouterError::ResourceHandler(basename.to_owned())),
        };

        let (name_base, base_path) = expand_basename(basename);
        let mut resource = Resource {
            registry,
            controller,
            name_base,
            base_path,
            routes: vec![],
        };

        for (action, verbs, suffix) in actions() {
            resource.add_action(action, &verbs, suffix, group)?;
        }
        Ok(resource)
    }

    /// The generated `(action, id)` pairs, in generation order.
    pub fn routes(&self) -> &[(String, RouteId)] {
        &self.routes
    }

    /// The ids of the generated routes, in generation order.
    pub fn ids(&self) -> Vec<RouteId> {
        self.routes.iter().map(|(_, id)| *id).collect()
    }

    /// Retains only the named actions, removing every other generated route
    /// from this resource and from the shared registry.
    pub fn only(&mut self, keep: &[&str]) -> &mut Self {
        self.filter(|action| keep.contains(&action));
        self
    }

    /// Removes the named actions from this resource and from the shared
    /// registry, retaining the complement.
    pub fn except(&mut self, drop: &[&str]) -> &mut Self {
        self.filter(|action| !drop.contains(&action));
        self
    }

    /// Appends a member sub-route at `{base}/:id/{path}`, answering GET and
    /// HEAD, handled by `{controller}.{path}` and named after the path.  An
    /// empty path is a configuration error.
    pub fn member(&mut self, path: &str) -> Result<&mut Self, RouterError> {
        self.member_via(&[http::Method::GET, http::Method::HEAD], path)
    }

    /// As [`Resource::member`], with an explicit verb set.
    pub fn member_via(
        &mut self,
        verbs: &[http::Method],
        path: &str,
    ) -> Result<&mut Self, RouterError> {
        self.add_sub_route(verbs, path, true)
    }

    /// Appends a collection sub-route at `{base}/{path}`, answering GET and
    /// HEAD, handled by `{controller}.{path}` and named after the path.  An
    /// empty path is a configuration error.
    pub fn collection(&mut self, path: &str) -> Result<&mut Self, RouterError> {
        self.collection_via(&[http::Method::GET, http::Method::HEAD], path)
    }

    /// As [`Resource::collection`], with an explicit verb set.
    pub fn collection_via(
        &mut self,
        verbs: &[http::Method],
        path: &str,
    ) -> Result<&mut Self, RouterError> {
        self.add_sub_route(verbs, path, false)
    }

    /// Attaches named-middleware keys to every route of the resource.
    pub fn middleware<S: AsRef<str>>(&mut self, keys: &[S]) -> &mut Self {
        let ids = self.ids();
        self.registry.append_middleware(&ids, keys);
        self
    }

    /// Attaches named-middleware keys selectively: each entry maps a
    /// middleware key to the actions it applies to.  Unknown action names
    /// are skipped.
    pub fn middleware_for(&mut self, mapping: &[(&str, &[&str])]) -> &mut Self {
        for (key, actions) in mapping {
            for action in *actions {
                if let Some(id) = self.action_id(action) {
                    self.registry.append_middleware(&[id], &[key]);
                }
            }
        }
        self
    }

    /// Renames generated routes: each entry maps an original action to its
    /// new name, which is re-qualified with the resource's name base.
    pub fn rename(&mut self, mapping: &[(&str, &str)]) -> &mut Self {
        for (action, new) in mapping {
            if let Some(id) = self.action_id(action) {
                let name = self.route_name(new);
                if let Some(record) = self.registry.get_mut(id) {
                    record.set_name(&name);
                }
            }
        }
        self
    }

    fn add_action(
        &mut self,
        action: &str,
        verbs: &[http::Method],
        suffix: &str,
        group: Option<&str>,
    ) -> Result<(), RouterError> {
        let path = if suffix.is_empty() {
            self.base_path.clone()
        } else {
            join_paths(&self.base_path, suffix)
        };
        let handler = Handler::Controller(format!("{}.{}", self.controller, action));
        let id = self.registry.register(&path, verbs, handler, group)?;
        let name = self.route_name(action);
        if let Some(record) = self.registry.get_mut(id) {
            record.set_name(&name);
        }
        self.routes.push((action.to_owned(), id));
        Ok(())
    }

    fn add_sub_route(
        &mut self,
        verbs: &[http::Method],
        path: &str,
        member: bool,
    ) -> Result<&mut Self, RouterError> {
        let action = path.trim_matches('/');
        if action.is_empty() {
            return Err(RouterError::EmptySubRoutePath);
        }

        let full = if member {
            join_paths(&join_paths(&self.base_path, "/:id"), action)
        } else {
            join_paths(&self.base_path, action)
        };
        let handler = Handler::Controller(format!("{}.{}", self.controller, action));
        let id = self.registry.register(&full, verbs, handler, None)?;
        let name = self.route_name(action);
        if let Some(record) = self.registry.get_mut(id) {
            record.set_name(&name);
        }
        self.routes.push((action.to_owned(), id));
        Ok(self)
    }

    fn filter<P: Fn(&str) -> bool>(&mut self, keep: P) {
        let removed: Vec<RouteId> = self
            .routes
            .iter()
            .filter(|(action, _)| !keep(action))
            .map(|(_, id)| *id)
            .collect();
        for id in &removed {
            self.registry.remove(*id);
        }
        self.routes.retain(|(action, _)| keep(action));
    }

    fn action_id(&self, action: &str) -> Option<RouteId> {
        self.routes
            .iter()
            .find(|(name, _)| name == action)
            .map(|(_, id)| *id)
    }

    fn route_name(&self, action: &str) -> String {
        if self.name_base.is_empty() {
            action.to_owned()
        } else {
            format!("{}.{}", self.name_base, action)
        }
    }
}

/// Expands a dotted resource base name into its route-name base and its path
/// base.  Every dotted segment except the last nests as
/// `segment/:segment_id/`.
fn expand_basename(basename: &str) -> (String, String) {
    let trimmed = basename.trim_matches('/');
    if trimmed.is_empty() {
        return (String::new(), "/".to_owned());
    }

    let segments: Vec<&str> = trimmed.split('.').collect();
    let (last, parents) = segments.split_last().unwrap();
    let mut path = String::from("/");
    for parent in parents {
        path.push_str(parent);
        path.push_str("/:");
        path.push_str(parent);
        path.push_str("_id/");
    }
    path.push_str(last);
    (trimmed.to_owned(), path)
}
