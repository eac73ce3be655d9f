use super::route::{RouteData, RouteId, RouteRecord};
use crate::error::RouterError;
use crate::handler::Handler;

/// The ordered, in-memory route table.
///
/// Records are appended in registration order and the resolver scans them in
/// that order, so registration order is an observable guarantee: more
/// specific routes must be registered before more general ones (`/user/create`
/// before `/user/:id`).  Names are not deduplicated on insert; storage is
/// append-only, and name lookup returns the first match.
pub struct RouteRegistry {
    routes: Vec<RouteRecord>,
    next_id: u64,
}

impl RouteRegistry {
    pub(crate) fn new() -> Self {
        RouteRegistry {
            routes: vec![],
            next_id: 0,
        }
    }

    /// Constructs and appends a record.  The path is normalized to start with
    /// `/`, duplicate verbs are dropped, and the record's name defaults to
    /// the normalized template.
    pub fn register(
        &mut self,
        path: &str,
        verbs: &[http::Method],
        handler: Handler,
        group: Option<&str>,
    ) -> Result<RouteId, RouterError> {
        let path = normalize(path);
        let mut set: Vec<http::Method> = Vec::with_capacity(verbs.len());
        for verb in verbs {
            if !set.contains(verb) {
                set.push(verb.clone());
            }
        }
        if set.is_empty() {
            return Err(RouterError::EmptyVerbs);
        }

        let id = RouteId(self.next_id);
        self.next_id += 1;
        log::trace!("register: {:?} {}", set, path);
        let record = RouteRecord::new(id, path, set, handler, group.map(str::to_owned))?;
        self.routes.push(record);
        Ok(id)
    }

    /// The number of records in the registry.
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// The records, in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &RouteRecord> {
        self.routes.iter()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut RouteRecord> {
        self.routes.iter_mut()
    }

    /// The most recently appended record, if any.  Callers driving a fluent
    /// configuration flow use this to annotate "the route just added"; they
    /// must guard the empty-registry case.
    pub fn last_registered(&self) -> Option<&RouteRecord> {
        self.routes.last()
    }

    /// The record with the given id, if it is still registered.
    pub fn get(&self, id: RouteId) -> Option<&RouteRecord> {
        self.routes.iter().find(|record| record.id() == id)
    }

    pub(crate) fn get_mut(&mut self, id: RouteId) -> Option<&mut RouteRecord> {
        self.routes.iter_mut().find(|record| record.id() == id)
    }

    /// The first record satisfying the predicate, if any.
    pub fn find<P>(&self, predicate: P) -> Option<&RouteRecord>
    where
        P: Fn(&RouteRecord) -> bool,
    {
        self.routes.iter().find(|record| predicate(record))
    }

    /// Removes the first record whose name equals the given value.  Absence
    /// is a no-op, not an error.
    pub fn remove_by_name(&mut self, name: &str) {
        if let Some(index) = self.routes.iter().position(|record| record.name() == name) {
            self.routes.remove(index);
        }
    }

    pub(crate) fn remove(&mut self, id: RouteId) {
        self.routes.retain(|record| record.id() != id);
    }

    /// Appends named-middleware keys to every record in the batch,
    /// order-preserving.
    pub fn append_middleware<S: AsRef<str>>(&mut self, ids: &[RouteId], keys: &[S]) {
        for id in ids {
            if let Some(record) = self.get_mut(*id) {
                record.push_middleware(keys);
            }
        }
    }

    /// Prepends a path segment to every record in the batch, recompiling each
    /// pattern.  A bare `/` template is replaced wholesale by the prefix, so
    /// prefixing never produces `//`.
    pub fn prefix(&mut self, ids: &[RouteId], segment: &str) -> Result<(), RouterError> {
        let segment = normalize(segment);
        for id in ids {
            if let Some(record) = self.get_mut(*id) {
                let path = if record.path() == "/" {
                    segment.clone()
                } else {
                    join_paths(&segment, record.path())
                };
                record.set_path(path)?;
            }
        }
        Ok(())
    }

    /// Binds every record in the batch to a domain pattern.  The pattern is
    /// recompiled eagerly, so the records are immediately resolvable against
    /// the qualified template; re-tagging with the same domain is idempotent.
    pub fn tag_domain(&mut self, ids: &[RouteId], domain: &str) -> Result<(), RouterError> {
        for id in ids {
            if let Some(record) = self.get_mut(*id) {
                record.set_domain(domain)?;
            }
        }
        Ok(())
    }

    /// Appends a `:format(.ext1|.ext2)` suffix to the record's template and
    /// recompiles it.  With `strict` the suffix is required; otherwise the
    /// un-suffixed path still matches.
    pub fn add_formats(
        &mut self,
        id: RouteId,
        extensions: &[&str],
        strict: bool,
    ) -> Result<(), RouterError> {
        match self.get_mut(id) {
            Some(record) => record.add_formats(extensions, strict),
            None => Ok(()),
        }
    }

    /// The whole table as plain data, in registration order.
    pub fn to_data(&self) -> Vec<RouteData> {
        self.routes.iter().map(RouteRecord::to_data).collect()
    }
}

impl std::fmt::Debug for RouteRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouteRegistry")
            .field("routes", &self.routes)
            .finish()
    }
}

pub(crate) fn normalize(path: &str) -> String {
    if path.starts_with('/') {
        path.to_owned()
    } else {
        format!("/{}", path)
    }
}

// Base *MUST* be either `""` or start with `"/"`.
pub(crate) fn join_paths(base: &str, extend: &str) -> String {
    let mut buffer = String::with_capacity(base.len() + extend.len());
    buffer.push_str(base);

    match (base.ends_with('/'), extend.starts_with('/')) {
        (true, true) => {
            buffer.push_str(&extend[1..]);
        }
        (false, true) | (true, false) => {
            buffer.push_str(extend);
        }
        (false, false) => {
            buffer.push('/');
            buffer.push_str(extend);
        }
    }

    buffer.shrink_to_fit();
    buffer
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::Handler;

    fn handler() -> Handler {
        Handler::Controller("TestController.action".to_owned())
    }

    fn registry_with(paths: &[&str]) -> (RouteRegistry, Vec<RouteId>) {
        let mut registry = RouteRegistry::new();
        let ids = paths
            .iter()
            .map(|path| {
                registry
                    .register(path, &[http::Method::GET], handler(), None)
                    .unwrap()
            })
            .collect();
        (registry, ids)
    }

    #[test]
    fn test_join_paths() {
        assert_eq!(join_paths("", "/id"), "/id");
        assert_eq!(join_paths("", "id"), "/id");
        assert_eq!(join_paths("/user", "/id"), "/user/id");
        assert_eq!(join_paths("/user/", "/id"), "/user/id");
        assert_eq!(join_paths("/user/", "id"), "/user/id");
    }

    #[test]
    fn test_register_normalizes() {
        let (registry, ids) = registry_with(&["user/:id"]);
        let record = registry.get(ids[0]).unwrap();
        assert_eq!(record.path(), "/user/:id");
        assert_eq!(record.name(), "/user/:id");
    }

    #[test]
    fn test_register_dedups_verbs() {
        let mut registry = RouteRegistry::new();
        let id = registry
            .register(
                "/user",
                &[http::Method::GET, http::Method::GET, http::Method::HEAD],
                handler(),
                None,
            )
            .unwrap();
        assert_eq!(
            registry.get(id).unwrap().verbs(),
            &[http::Method::GET, http::Method::HEAD]
        );
    }

    #[test]
    fn test_register_empty_verbs() {
        let mut registry = RouteRegistry::new();
        let result = registry.register("/user", &[], handler(), None);
        assert!(matches!(result, Err(RouterError::EmptyVerbs)));
    }

    #[test]
    fn test_last_registered() {
        let (registry, _) = registry_with(&["/a", "/b"]);
        assert_eq!(registry.last_registered().unwrap().path(), "/b");
        assert!(RouteRegistry::new().last_registered().is_none());
    }

    #[test]
    fn test_remove_by_name_absent_is_noop() {
        let (mut registry, _) = registry_with(&["/a"]);
        registry.remove_by_name("/missing");
        assert_eq!(registry.len(), 1);
        registry.remove_by_name("/a");
        assert!(registry.is_empty());
    }

    #[test]
    fn test_duplicate_names_first_match_wins() {
        let (mut registry, ids) = registry_with(&["/a", "/b"]);
        registry.get_mut(ids[0]).unwrap().set_name("dup");
        registry.get_mut(ids[1]).unwrap().set_name("dup");
        let found = registry.find(|record| record.name() == "dup").unwrap();
        assert_eq!(found.id(), ids[0]);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_prefix() {
        let (mut registry, ids) = registry_with(&["/user/:id", "/"]);
        registry.prefix(&ids, "admin").unwrap();
        assert_eq!(registry.get(ids[0]).unwrap().path(), "/admin/user/:id");
        // the bare root is replaced wholesale, not concatenated
        assert_eq!(registry.get(ids[1]).unwrap().path(), "/admin");
        assert!(registry.get(ids[0]).unwrap().pattern().is_match("/admin/user/5"));
    }

    #[test]
    fn test_tag_domain_recompiles() {
        let (mut registry, ids) = registry_with(&["/dashboard"]);
        registry.tag_domain(&ids, "admin.example.com").unwrap();
        let record = registry.get(ids[0]).unwrap();
        assert_eq!(record.domain(), Some("admin.example.com"));
        assert!(record.pattern().is_match("admin.example.com/dashboard"));
        assert!(!record.pattern().is_match("/dashboard"));
    }

    #[test]
    fn test_add_formats_strict() {
        let (mut registry, ids) = registry_with(&["/report"]);
        registry.add_formats(ids[0], &["json", "xml"], true).unwrap();
        let record = registry.get(ids[0]).unwrap();
        assert_eq!(record.path(), "/report:format(.json|.xml)");
        assert!(record.pattern().is_match("/report.json"));
        assert!(!record.pattern().is_match("/report"));
    }

    #[test]
    fn test_add_formats_lenient() {
        let (mut registry, ids) = registry_with(&["/report"]);
        registry.add_formats(ids[0], &["json"], false).unwrap();
        let record = registry.get(ids[0]).unwrap();
        assert!(record.pattern().is_match("/report"));
        assert!(record.pattern().is_match("/report.json"));
    }

    #[test]
    fn test_append_middleware_batch() {
        let (mut registry, ids) = registry_with(&["/a", "/b"]);
        registry.append_middleware(&ids, &["auth:basic", "throttle"]);
        for id in ids {
            assert_eq!(
                registry.get(id).unwrap().middleware(),
                ["auth:basic", "throttle"]
            );
        }
    }
}
