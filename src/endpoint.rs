use crate::request::Request;
use crate::response::{IntoResponse, Response};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// A reference-counted, pinned endpoint, shared between the route table and
/// every in-flight request.
pub type SharedEndpoint = Pin<Arc<dyn Endpoint>>;

#[async_trait]
/// An HTTP request handler.
///
/// This is automatically implemented for
/// `Fn(Request) -> impl Future<Output = impl IntoResponse>` types, but it may
/// be useful to implement this yourself.  All this is meant to do is be a
/// fallible function from a [`Request`] into a [`Response`].
pub trait Endpoint: Send + Sync + 'static {
    #[must_use]
    /// Transforms the request into the response.  However, a request may fail,
    /// and such a failure can be handled down the stack.
    async fn apply(self: Pin<&Self>, request: Request) -> Result<Response, anyhow::Error>;

    #[doc(hidden)]
    fn describe(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", std::any::type_name::<Self>())
    }
}

impl std::fmt::Debug for dyn Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.describe(f)
    }
}

#[async_trait]
impl<Res, F, Fut> Endpoint for F
where
    F: Fn(Request) -> Fut + Sync + Send + 'static,
    Fut: Future<Output = Res> + Send + 'static,
    Res: IntoResponse + Send + 'static,
{
    async fn apply(self: Pin<&Self>, request: Request) -> Result<Response, anyhow::Error> {
        self(request).await.into_response()
    }
}

/// An [`Endpoint`] backed by a synchronous function of the request.  Create
/// one with [`sync`].
pub struct SyncEndpoint<F>(F);

// The wrapped function has no Debug of its own.
impl<F> std::fmt::Debug for SyncEndpoint<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SyncEndpoint")
    }
}

#[async_trait]
impl<F, Res> Endpoint for SyncEndpoint<F>
where
    F: Fn(Request) -> Res + Send + Sync + 'static,
    Res: IntoResponse + Send + 'static,
{
    async fn apply(self: Pin<&Self>, request: Request) -> Result<Response, anyhow::Error> {
        let f = &self.0;
        f(request).into_response()
    }
}

/// An [`Endpoint`] backed by a synchronous function that ignores the request.
/// Create one with [`simple`].
pub struct SimpleEndpoint<F>(F);

impl<F> std::fmt::Debug for SimpleEndpoint<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SimpleEndpoint")
    }
}

#[async_trait]
impl<F, Res> Endpoint for SimpleEndpoint<F>
where
    F: Fn() -> Res + Send + Sync + 'static,
    Res: IntoResponse + Send + 'static,
{
    async fn apply(self: Pin<&Self>, _request: Request) -> Result<Response, anyhow::Error> {
        let f = &self.0;
        f().into_response()
    }
}

/// Wraps a synchronous function of the request into an endpoint.
///
/// # Examples
/// ```rust
/// let endpoint = junction::sync(|request| {
///     junction::Response::text(format!("hit {}", request.uri().path()))
/// });
/// # drop(endpoint);
/// ```
pub fn sync<F, Res>(f: F) -> SyncEndpoint<F>
where
    F: Fn(Request) -> Res + Send + Sync + 'static,
    Res: IntoResponse + Send + 'static,
{
    SyncEndpoint(f)
}

/// Wraps a synchronous nullary function into an endpoint.
///
/// # Examples
/// ```rust
/// let endpoint = junction::simple(junction::Response::empty_204);
/// # drop(endpoint);
/// ```
pub fn simple<F, Res>(f: F) -> SimpleEndpoint<F>
where
    F: Fn() -> Res + Send + Sync + 'static,
    Res: IntoResponse + Send + 'static,
{
    SimpleEndpoint(f)
}
