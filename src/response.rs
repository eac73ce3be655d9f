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
}

#[derive(Debug)]
#[must_use]
/// An HTTP response context.
///
/// Like [`crate::Request`], the routing core never inspects this beyond
/// constructing sentinel responses (`404` on a resolution miss); it flows
/// back through the middleware chain untouched.
pub struct Response(http::Response<Bytes>);

impl Response {
    forward! {
        /// The status code of the response.
        pub fn status(&self) -> http::StatusCode;
        /// The headers of the response.
        pub fn headers(&self) -> &http::HeaderMap;
    }

    /// Creates an empty response with the given status code.
    pub fn empty_status(status: http::StatusCode) -> Self {
        let mut response = http::Response::new(Bytes::new());
        *response.status_mut() = status;
        Response(response)
    }

    /// Creates an empty response with a status code of 204.
    ///
    /// # Examples
    /// ```rust
    /// # use junction::Response;
    /// let response = Response::empty_204();
    /// assert_eq!(response.status(), http::StatusCode::NO_CONTENT);
    /// ```
    pub fn empty_204() -> Self {
        Response::empty_status(http::StatusCode::NO_CONTENT)
    }

    /// Creates an empty response with a status code of 404.
    pub fn empty_404() -> Self {
        Response::empty_status(http::StatusCode::NOT_FOUND)
    }

    /// Creates an empty response with a status code of 500.
    pub fn empty_500() -> Self {
        Response::empty_status(http::StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// Creates a `200 OK` response with a `text/plain` body.
    ///
    /// # Examples
    /// ```rust
    /// # use junction::Response;
    /// let response = Response::text("hello, world!");
    /// assert_eq!(response.status(), http::StatusCode::OK);
    /// assert_eq!(&response.body()[..], b"hello, world!");
    /// ```
    pub fn text<S: Into<String>>(body: S) -> Self {
        let mut response = http::Response::new(Bytes::from(body.into().into_bytes()));
        response.headers_mut().insert(
            http::header::CONTENT_TYPE,
            http::HeaderValue::from_static("text/plain; charset=utf-8"),
        );
        Response(response)
    }

    /// The body of the response.
    pub fn body(&self) -> &Bytes {
        self.0.body()
    }

    /// Consumes the wrapper, returning the underlying response.
    pub fn into_inner(self) -> http::Response<Bytes> {
        self.0
    }
}

impl From<http::Response<Bytes>> for Response {
    fn from(response: http::Response<Bytes>) -> Self {
        Response(response)
    }
}

/// Conversion of endpoint return values into a [`Response`].
///
/// This exists so that endpoints can return a plain [`Response`], a
/// `Result<Response, _>`, or a loose value like a string, and all of them
/// flow uniformly through [`crate::Endpoint::apply`].
pub trait IntoResponse {
    /// Performs the conversion.  The conversion itself may fail, and such a
    /// failure is treated the same as an endpoint failure.
    fn into_response(self) -> Result<Response, anyhow::Error>;
}

impl IntoResponse for Response {
    fn into_response(self) -> Result<Response, anyhow::Error> {
        Ok(self)
    }
}

impl<R, E> IntoResponse for Result<R, E>
where
    R: IntoResponse,
    E: Into<anyhow::Error>,
{
    fn into_response(self) -> Result<Response, anyhow::Error> {
        self.map_err(Into::into).and_then(IntoResponse::into_response)
    }
}

impl IntoResponse for String {
    fn into_response(self) -> Result<Response, anyhow::Error> {
        Ok(Response::text(self))
    }
}

impl IntoResponse for &'static str {
    fn into_response(self) -> Result<Response, anyhow::Error> {
        Ok(Response::text(self))
    }
}

impl IntoResponse for http::StatusCode {
    fn into_response(self) -> Result<Response, anyhow::Error> {
        Ok(Response::empty_status(self))
    }
}
