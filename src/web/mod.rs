use crate::web::handlers::{health, home, login, logout, not_found, protected, register};
use anyhow::Result;
use axum::{
    Extension, Router,
    body::Body,
    extract::MatchedPath,
    http::{HeaderName, HeaderValue, Request},
    middleware,
    routing::{get, post},
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    request_id::PropagateRequestIdLayer, set_header::SetRequestHeaderLayer, trace::TraceLayer,
};
use tracing::{Span, info, info_span};
use ulid::Ulid;

pub mod guard;
pub(crate) mod handlers;
pub mod pages;
pub mod session;
pub mod state;

pub use self::state::{AppState, FrontendConfig};

const REQUEST_ID_HEADER: &str = "x-request-id";

/// Build the front-end router with the route guard and request tracing applied.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(home))
        .route("/health", get(health))
        .route("/login", get(login::login_page).post(login::login))
        .route(
            "/register",
            get(register::register_page).post(register::register),
        )
        .route("/logout", post(logout::logout))
        .route("/protected", get(protected::protected))
        .route("/protected/*path", get(protected::protected))
        .fallback(not_found)
        .layer(middleware::from_fn(guard::route_guard))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestHeaderLayer::if_not_present(
                    HeaderName::from_static(REQUEST_ID_HEADER),
                    |_req: &_| HeaderValue::from_str(Ulid::new().to_string().as_str()).ok(),
                ))
                .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
                    REQUEST_ID_HEADER,
                )))
                .layer(TraceLayer::new_for_http().make_span_with(make_span))
                .layer(Extension(state)),
        )
}

/// Start the server
/// # Errors
/// Return error if failed to start the server
pub async fn new(port: u16, state: Arc<AppState>) -> Result<()> {
    let listener = TcpListener::bind(format!("::0:{port}")).await?;

    info!("Listening on [::]:{}", port);

    serve(listener, state).await
}

/// Serve on an already bound listener until Ctrl-C.
/// # Errors
/// Return error if the server fails
pub async fn serve(listener: TcpListener, state: Arc<AppState>) -> Result<()> {
    let app = router(state);

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(async {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("Gracefully shutdown");
            }
        })
        .await?;

    Ok(())
}

fn make_span(request: &Request<Body>) -> Span {
    let request_id = request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|val| val.to_str().ok())
        .unwrap_or("none");
    let matched_path = request
        .extensions()
        .get::<MatchedPath>()
        .map_or_else(|| request.uri().path(), MatchedPath::as_str);

    info_span!(
        "http.request",
        http.method = %request.method(),
        http.route = matched_path,
        request_id
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use axum::{
        body::to_bytes,
        http::{
            StatusCode,
            header::{CONTENT_TYPE, COOKIE, LOCATION, SET_COOKIE},
        },
        response::Response,
    };
    use serde_json::json;
    use tower::ServiceExt;
    use url::Url;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn app(api_url: &str) -> Router {
        let config = FrontendConfig::new(Url::parse(api_url).unwrap());
        router(Arc::new(AppState::new(config).unwrap()))
    }

    fn get_request(uri: &str, cookie: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(COOKIE, cookie);
        }
        builder.body(Body::empty()).unwrap()
    }

    fn form_request(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn location(response: &Response) -> &str {
        response.headers().get(LOCATION).unwrap().to_str().unwrap()
    }

    async fn body_of(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn protected_without_token_redirects_to_login() {
        let response = app("http://127.0.0.1:9")
            .oneshot(get_request("/protected/dashboard", None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(location(&response), "/login");
    }

    #[tokio::test]
    async fn auth_pages_with_token_redirect_home() {
        for uri in ["/login", "/register"] {
            let response = app("http://127.0.0.1:9")
                .oneshot(get_request(uri, Some("token=jwt-1")))
                .await
                .unwrap();

            assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
            assert_eq!(location(&response), "/");
        }
    }

    #[tokio::test]
    async fn signed_in_form_post_lands_on_home() {
        let app = app("http://127.0.0.1:9");
        let request = Request::builder()
            .method("POST")
            .uri("/login")
            .header(COOKIE, "token=jwt-1")
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from("email=ada%40example.com&password=pw"))
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/");

        // A browser follows a 303 with a GET.
        let response = app
            .oneshot(get_request(location(&response), Some("token=jwt-1")))
            .await
            .unwrap();
        assert!(response.status().is_success());
    }

    #[tokio::test]
    async fn authorization_header_counts_as_token() {
        let request = Request::builder()
            .uri("/login")
            .header("authorization", "Bearer jwt-1")
            .body(Body::empty())
            .unwrap();
        let response = app("http://127.0.0.1:9").oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(location(&response), "/");
    }

    #[tokio::test]
    async fn responses_carry_a_request_id() {
        let response = app("http://127.0.0.1:9")
            .oneshot(get_request("/", None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let id = response.headers().get(REQUEST_ID_HEADER).unwrap();
        assert!(Ulid::from_string(id.to_str().unwrap()).is_ok());
    }

    #[tokio::test]
    async fn unknown_paths_render_not_found() {
        let response = app("http://127.0.0.1:9")
            .oneshot(get_request("/missing", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn login_form_sets_cookie_and_redirects() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/login"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "token": "jwt-1" })))
            .expect(1)
            .mount(&server)
            .await;

        let response = app(&server.uri())
            .oneshot(form_request(
                "/login",
                "email=ada%40example.com&password=correct+horse",
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/protected");
        let cookie = response.headers().get(SET_COOKIE).unwrap().to_str().unwrap();
        assert!(cookie.starts_with("token=jwt-1;"));
        assert!(cookie.contains("HttpOnly"));
    }

    #[tokio::test]
    async fn login_form_rerenders_backend_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/login"))
            .respond_with(
                ResponseTemplate::new(401)
                    .set_body_json(json!({ "message": "Invalid email or password" })),
            )
            .mount(&server)
            .await;

        let response = app(&server.uri())
            .oneshot(form_request(
                "/login",
                "email=ada%40example.com&password=wrong",
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(response.headers().get(SET_COOKIE).is_none());
        let body = body_of(response).await;
        assert!(body.contains("Invalid email or password"));
        assert!(body.contains("ada@example.com"));
    }

    #[tokio::test]
    async fn login_form_validates_before_calling_backend() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/login"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let response = app(&server.uri())
            .oneshot(form_request("/login", "email=not-an-email&password=pw"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn register_form_redirects_to_login_notice() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/register"))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "token": "jwt-new" })))
            .expect(1)
            .mount(&server)
            .await;

        let app = app(&server.uri());
        let response = app
            .clone()
            .oneshot(form_request(
                "/register",
                "email=ada%40example.com&password=pw",
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/login?registered=1");
        // Registering does not sign the user in.
        assert!(response.headers().get(SET_COOKIE).is_none());

        let response = app
            .oneshot(get_request("/login?registered=1", None))
            .await
            .unwrap();
        assert!(body_of(response).await.contains("Account created"));
    }

    #[tokio::test]
    async fn logout_clears_cookie_even_when_backend_is_down() {
        let response = app("http://127.0.0.1:9")
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/logout")
                    .header(COOKIE, "token=jwt-1")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/");
        let cookie = response.headers().get(SET_COOKIE).unwrap().to_str().unwrap();
        assert!(cookie.starts_with("token=;"));
        assert!(cookie.contains("Max-Age=0"));
    }

    #[tokio::test]
    async fn protected_page_shows_current_user() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/auth/me"))
            .and(header("authorization", "Bearer jwt-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "user": { "id": 1, "email": "ada@example.com" }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let response = app(&server.uri())
            .oneshot(get_request("/protected", Some("token=jwt-1")))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_of(response).await;
        assert!(body.contains("ada@example.com"));
        assert!(body.contains(r#"action="/logout""#));
    }
}
