//! Junction is a pattern-based HTTP routing and middleware-composition core.
//! It owns the route table of an application: routes are registered at
//! bootstrap (directly, through groups, or generated as resources), compiled
//! into matchable patterns, and resolved per request against a verb, a path,
//! and a host, with the matching route's middleware composed into a single
//! chain around its handler.
//!
//! Junction deliberately stops at the in-process boundary: it does not speak
//! HTTP on the wire, and it treats request and response contexts as opaque
//! values flowing through the chain.
//!
//! # Examples
//! ```rust
//! # #[tokio::main]
//! # async fn main() -> Result<(), anyhow::Error> {
//! let mut router = junction::router();
//! router.get(
//!     "/hello",
//!     junction::simple(|| junction::Response::text("hello, world!")),
//! );
//! router.prepare()?;
//! let response = router.handle(junction::Request::get("/hello")?).await?;
//! assert_eq!(response.status(), http::StatusCode::OK);
//! # Ok(())
//! # }
//! ```
#![deny(clippy::correctness)]
#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

#[macro_use]
extern crate async_trait;

mod config;
mod endpoint;
mod error;
mod handler;
pub mod middleware;
mod request;
mod response;
mod router;

pub use self::config::RouterConfig;
pub use self::endpoint::{simple, sync, Endpoint, SharedEndpoint, SimpleEndpoint, SyncEndpoint};
pub use self::error::RouterError;
pub use self::handler::{ControllerMap, Handler, HandlerResolver, IntoHandler};
pub use self::middleware::{shared, Chain, Middleware, MiddlewareSet, Next, SharedMiddleware};
pub use self::request::Request;
pub use self::response::{IntoResponse, Response};
pub use self::router::{
    DomainMatcher, Group, Pattern, Resource, RouteData, RouteHandle, RouteId, RouteMatch,
    RouteRecord, RouteRegistry, Router,
};

#[must_use]
#[inline]
/// This creates a new HTTP router.  This is a shortcut for [`Router::default`].
pub fn router() -> Router {
    Router::default()
}
