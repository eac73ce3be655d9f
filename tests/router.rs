use junction::middleware::TraceMiddleware;
use junction::{
    simple, sync, ControllerMap, Handler, Middleware, Next, Request, Response, Router,
};
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::time::Duration;

type CallLog = Arc<Mutex<Vec<String>>>;

#[derive(Debug)]
struct Recorder {
    name: &'static str,
    log: CallLog,
}

#[async_trait::async_trait]
impl Middleware for Recorder {
    async fn apply(
        self: Pin<&Self>,
        request: Request,
        next: Next<'_>,
        _params: &[String],
    ) -> Result<Response, anyhow::Error> {
        self.log.lock().unwrap().push(format!("{}:in", self.name));
        let result = next.apply(request).await;
        self.log.lock().unwrap().push(format!("{}:out", self.name));
        result
    }
}

#[derive(Debug)]
struct ParamRecorder {
    log: CallLog,
}

#[async_trait::async_trait]
impl Middleware for ParamRecorder {
    async fn apply(
        self: Pin<&Self>,
        request: Request,
        next: Next<'_>,
        params: &[String],
    ) -> Result<Response, anyhow::Error> {
        self.log.lock().unwrap().push(params.join("+"));
        next.apply(request).await
    }
}

#[derive(Debug)]
struct Reject;

#[async_trait::async_trait]
impl Middleware for Reject {
    async fn apply(
        self: Pin<&Self>,
        _request: Request,
        _next: Next<'_>,
        _params: &[String],
    ) -> Result<Response, anyhow::Error> {
        Ok(Response::empty_status(http::StatusCode::UNAUTHORIZED))
    }
}

#[derive(Debug)]
struct Pause;

#[async_trait::async_trait]
impl Middleware for Pause {
    async fn apply(
        self: Pin<&Self>,
        request: Request,
        next: Next<'_>,
        _params: &[String],
    ) -> Result<Response, anyhow::Error> {
        tokio::time::sleep(Duration::from_millis(5)).await;
        next.apply(request).await
    }
}

fn log_endpoint(log: CallLog) -> Handler {
    Handler::callable(simple(move || {
        log.lock().unwrap().push("handler".to_owned());
        Response::text("done")
    }))
}

#[tokio::test]
async fn onion_ordering() {
    let log: CallLog = Arc::default();
    let mut router = Router::default();
    router.register_global(Recorder {
        name: "a",
        log: log.clone(),
    });
    router.register_global(Recorder {
        name: "b",
        log: log.clone(),
    });
    router.get("/work", log_endpoint(log.clone()));
    router.prepare().unwrap();

    let response = router.handle(Request::get("/work").unwrap()).await.unwrap();
    assert_eq!(response.status(), http::StatusCode::OK);
    assert_eq!(
        *log.lock().unwrap(),
        ["a:in", "b:in", "handler", "b:out", "a:out"]
    );
}

#[tokio::test]
async fn global_runs_before_route_middleware() {
    let log: CallLog = Arc::default();
    let mut router = Router::default();
    router.register_global(Recorder {
        name: "global",
        log: log.clone(),
    });
    router.register_named(
        "named",
        Recorder {
            name: "named",
            log: log.clone(),
        },
    );
    router.get("/work", log_endpoint(log.clone())).middleware(&["named"]);
    router.prepare().unwrap();

    router.handle(Request::get("/work").unwrap()).await.unwrap();
    assert_eq!(
        *log.lock().unwrap(),
        ["global:in", "named:in", "handler", "named:out", "global:out"]
    );
}

#[tokio::test]
async fn bound_parameters_reach_the_middleware() {
    let log: CallLog = Arc::default();
    let mut router = Router::default();
    router.register_named("auth", ParamRecorder { log: log.clone() });
    router
        .get("/secret", Handler::callable(simple(Response::empty_204)))
        .middleware(&["auth:basic,jwt"]);
    router.prepare().unwrap();

    router.handle(Request::get("/secret").unwrap()).await.unwrap();
    assert_eq!(*log.lock().unwrap(), ["basic+jwt"]);
}

#[tokio::test]
async fn short_circuit_skips_the_rest_of_the_chain() {
    let log: CallLog = Arc::default();
    let mut router = Router::default();
    router.register_named("reject", Reject);
    router.register_named(
        "after",
        Recorder {
            name: "after",
            log: log.clone(),
        },
    );
    router
        .get("/secret", log_endpoint(log.clone()))
        .middleware(&["reject", "after"]);
    router.prepare().unwrap();

    let response = router.handle(Request::get("/secret").unwrap()).await.unwrap();
    assert_eq!(response.status(), http::StatusCode::UNAUTHORIZED);
    assert!(log.lock().unwrap().is_empty());
}

#[tokio::test]
async fn suspension_propagates_through_the_chain() {
    let log: CallLog = Arc::default();
    let mut router = Router::default();
    router.register_global(Pause);
    router.register_global(Recorder {
        name: "inner",
        log: log.clone(),
    });
    router.get("/slow", log_endpoint(log.clone()));
    router.prepare().unwrap();

    let response = router.handle(Request::get("/slow").unwrap()).await.unwrap();
    assert_eq!(response.status(), http::StatusCode::OK);
    assert_eq!(*log.lock().unwrap(), ["inner:in", "handler", "inner:out"]);
}

#[tokio::test]
async fn resolved_params_are_visible_to_the_endpoint() {
    let mut router = Router::default();
    router
        .get(
            "/user/:id",
            sync(|request: Request| {
                let id = request.param("id").unwrap_or("?").to_owned();
                let verb = request.route().unwrap().verb.clone();
                Response::text(format!("{} {}", verb, id))
            }),
        )
        .name("user.show");
    router.prepare().unwrap();

    let response = router.handle(Request::get("/user/5").unwrap()).await.unwrap();
    assert_eq!(&response.body()[..], b"GET 5");
}

#[tokio::test]
async fn resource_routes_dispatch_through_the_resolver() {
    let mut controllers = ControllerMap::default();
    controllers.insert(
        "PostController.index",
        simple(|| Response::text("all posts")),
    );
    controllers.insert(
        "PostController.show",
        sync(|request: Request| {
            Response::text(format!("post {}", request.param("id").unwrap_or("?")))
        }),
    );

    let mut router = Router::default();
    router
        .resource("post", "PostController")
        .unwrap()
        .only(&["index", "show"]);
    router.handler_resolver(controllers);
    router.prepare().unwrap();

    let response = router.handle(Request::get("/post").unwrap()).await.unwrap();
    assert_eq!(&response.body()[..], b"all posts");
    let response = router.handle(Request::get("/post/42").unwrap()).await.unwrap();
    assert_eq!(&response.body()[..], b"post 42");
    // store was filtered out of the resource
    let response = router.handle(Request::post("/post").unwrap()).await.unwrap();
    assert_eq!(response.status(), http::StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn domain_bound_routes_follow_the_host() {
    let mut router = Router::default();
    router
        .get(
            "/dashboard",
            sync(|request: Request| {
                Response::text(format!(
                    "tenant {}",
                    request.param("tenant").unwrap_or("?")
                ))
            }),
        )
        .domain(":tenant.example.com")
        .unwrap();
    router.prepare().unwrap();

    let response = router
        .handle(Request::get("http://acme.example.com/dashboard").unwrap())
        .await
        .unwrap();
    assert_eq!(&response.body()[..], b"tenant acme");

    let response = router
        .handle(Request::get("http://example.com/dashboard").unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), http::StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn ported_host_header_still_matches_the_domain() {
    let mut router = Router::default();
    router
        .get("/dashboard", Handler::callable(simple(Response::empty_204)))
        .domain("admin.example.com")
        .unwrap();
    router.prepare().unwrap();

    let mut request = Request::get("/dashboard").unwrap();
    request.headers_mut().insert(
        http::header::HOST,
        http::HeaderValue::from_static("admin.example.com:8080"),
    );
    let response = router.handle(request).await.unwrap();
    assert_eq!(response.status(), http::StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn trace_middleware_wraps_the_chain() {
    let log: CallLog = Arc::default();
    let mut router = Router::default();
    router.register_global(TraceMiddleware::new());
    router.register_global(Recorder {
        name: "inner",
        log: log.clone(),
    });
    router.get("/traced", log_endpoint(log.clone()));
    router.prepare().unwrap();

    let response = router.handle(Request::get("/traced").unwrap()).await.unwrap();
    assert_eq!(response.status(), http::StatusCode::OK);
    assert_eq!(*log.lock().unwrap(), ["inner:in", "handler", "inner:out"]);
}

#[tokio::test]
async fn resolution_miss_is_an_empty_404() {
    let mut router = Router::default();
    router.get("/known", Handler::callable(simple(Response::empty_204)));
    router.prepare().unwrap();

    let response = router.handle(Request::get("/unknown").unwrap()).await.unwrap();
    assert_eq!(response.status(), http::StatusCode::NOT_FOUND);
    assert!(response.body().is_empty());
}

#[tokio::test]
async fn format_suffix_end_to_end() {
    let mut router = Router::default();
    router
        .get(
            "/report/:year",
            sync(|request: Request| {
                Response::text(format!(
                    "{}{}",
                    request.param("year").unwrap_or("?"),
                    request.param("format").unwrap_or("")
                ))
            }),
        )
        .formats(&["json", "xml"], true)
        .unwrap();
    router.prepare().unwrap();

    let response = router
        .handle(Request::get("/report/2024.json").unwrap())
        .await
        .unwrap();
    assert_eq!(&response.body()[..], b"2024.json");

    // strict formats reject the bare path
    let response = router.handle(Request::get("/report/2024").unwrap()).await.unwrap();
    assert_eq!(response.status(), http::StatusCode::NOT_FOUND);
}
