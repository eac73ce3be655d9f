#[derive(Debug, Clone, Default)]
/// Router-wide configuration.
///
/// This is constructed once at bootstrap and handed to [`crate::Router::new`];
/// nothing in this crate reads configuration from process-wide state.
///
/// # Examples
/// ```rust
/// let config = junction::RouterConfig {
///     handler_namespace: Some("app.controllers".into()),
///     ..Default::default()
/// };
/// let router = junction::Router::new(config);
/// # drop(router);
/// ```
pub struct RouterConfig {
    /// Namespace prepended (dot-separated) to every controller-style handler
    /// reference before it is handed to the [`crate::HandlerResolver`].  A
    /// route bound to `"PostController.show"` with a namespace of
    /// `"app.controllers"` resolves `"app.controllers.PostController.show"`.
    pub handler_namespace: Option<String>,
    /// Path segment prepended to every registered route template.  Useful
    /// when the router is mounted under a sub-path of a larger application.
    pub mount_prefix: Option<String>,
}

impl RouterConfig {
    /// Qualifies a controller reference with the configured namespace, if
    /// any.
    pub(crate) fn qualify(&self, reference: &str) -> String {
        match &self.handler_namespace {
            Some(namespace) => format!("{}.{}", namespace, reference),
            None => reference.to_owned(),
        }
    }
}
