use bytes::Bytes;

macro_rules! forward {
    () => {};
    (
        $(#[$m:meta])* $v:vis fn $name:ident(&self $(, $pn:ident: $pt:ty)*) -> $ret:ty;
        $($tail:tt)*
    ) => {
        $(#[$m])* $v fn $name(&self $(, $pn: $pt)*) -> $ret {
            (self.0).$name($($pn),*)
        }

        forward! { $($tail)* }
    };

    (
        $(#[$m:meta])* $v:vis fn $name:ident(&mut self $(, $pn:ident: $pt:ty)*) -> $ret:ty;
        $($tail:tt)*
    ) => {
        $(#[$m])* $v fn $name(&mut self $(, $pn: $pt)*) -> $ret {
            (self.0).$name($($pn),*)
        }

        forward! { $($tail)* }
    }
}

#[derive(Debug)]
/// An HTTP request context.
///
/// The routing core treats this as an opaque value: it reads the method, the
/// URI path, and the `Host` header to resolve a route, and otherwise passes
/// the request through the middleware chain untouched.  Extracted path
/// parameters are attached as a [`crate::RouteMatch`] extension, never stored
/// on the shared route record.
pub struct Request(http::Request<Bytes>);

impl Request {
    forward! {
        /// The URI of the request.
        pub fn uri(&self) -> &http::Uri;
        /// The method of the request.
        pub fn method(&self) -> &http::Method;
        /// The headers of the request.
        pub fn headers(&self) -> &http::HeaderMap;
        /// The extensions of the request.
        pub fn extensions(&self) -> &http::Extensions;
        /// A mutable reference to the extensions of the request.
        pub fn extensions_mut(&mut self) -> &mut http::Extensions;
        /// A mutable reference to the headers of the request.
        pub fn headers_mut(&mut self) -> &mut http::HeaderMap;
    }

    /// Creates a GET request against the given URI.
    ///
    /// # Examples
    /// ```rust
    /// # use junction::Request;
    /// let request = Request::get("/user/5").unwrap();
    /// assert_eq!(request.uri().path(), "/user/5");
    /// ```
    pub fn get<U>(uri: U) -> Result<Self, http::Error>
    where
        http::Uri: TryFrom<U>,
        <http::Uri as TryFrom<U>>::Error: Into<http::Error>,
    {
        Self::from_method(uri, http::Method::GET)
    }

    /// Creates a POST request against the given URI.
    pub fn post<U>(uri: U) -> Result<Self, http::Error>
    where
        http::Uri: TryFrom<U>,
        <http::Uri as TryFrom<U>>::Error: Into<http::Error>,
    {
        Self::from_method(uri, http::Method::POST)
    }

    /// Creates a request with the given method against the given URI.
    pub fn from_method<U>(uri: U, method: http::Method) -> Result<Self, http::Error>
    where
        http::Uri: TryFrom<U>,
        <http::Uri as TryFrom<U>>::Error: Into<http::Error>,
    {
        http::Request::builder()
            .uri(uri)
            .method(method)
            .body(Bytes::new())
            .map(Request)
    }

    /// The host this request was addressed to, taken from the `Host` header
    /// if present, falling back to the authority component of the URI.  Any
    /// `:port` suffix on the header value is stripped; domain patterns only
    /// ever see the host itself.
    pub fn host(&self) -> Option<&str> {
        self.headers()
            .get(http::header::HOST)
            .and_then(|value| value.to_str().ok())
            .map(strip_port)
            .or_else(|| self.uri().host())
    }

    /// A path parameter extracted during route resolution, if the request has
    /// been routed.
    ///
    /// # Examples
    /// ```rust,no_run
    /// # use junction::Request;
    /// # let request = Request::get("/user/5").unwrap();
    /// let id = request.param("id");
    /// ```
    pub fn param(&self, name: &str) -> Option<&str> {
        self.extensions()
            .get::<crate::RouteMatch>()
            .and_then(|matched| matched.param(name))
    }

    /// The route match attached during resolution, if any.
    pub fn route(&self) -> Option<&crate::RouteMatch> {
        self.extensions().get::<crate::RouteMatch>()
    }

    /// Consumes the wrapper, returning the underlying request.
    pub fn into_inner(self) -> http::Request<Bytes> {
        self.0
    }
}

impl From<http::Request<Bytes>> for Request {
    fn from(request: http::Request<Bytes>) -> Self {
        Request(request)
    }
}

// A bracketed IPv6 literal keeps its brackets; its colons are not a port
// separator.
fn strip_port(authority: &str) -> &str {
    if authority.starts_with('[') {
        match authority.find(']') {
            Some(end) => &authority[..=end],
            None => authority,
        }
    } else {
        authority.split(':').next().unwrap_or(authority)
    }
}
