use std::time::Duration;

use axum::body::Body;
use axum::http::header::{HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE, ORIGIN};
use axum::http::{HeaderName, Method, Request, Response};
use axum::routing::get;
use axum::Router;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::normalize_path::NormalizePathLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;
use tracing::Span;

use crate::api::{exams, handlers, marks, results, setup, students};
use crate::core::config::Settings;
use crate::core::state::AppState;

const REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Full application: service routes at the root, the portal API under the
/// configured prefix.
pub(crate) fn router(state: AppState) -> Router {
    let settings = state.settings();
    let prefix = settings.api().api_prefix.as_str();

    let mut app: Router<AppState> = Router::new()
        .route("/", get(handlers::root))
        .route("/healthz", get(handlers::healthz).head(handlers::healthz));

    // `nest("")` panics in axum.
    app = match prefix {
        "" => app.merge(portal_api()),
        prefix => app.nest(prefix, portal_api()),
    };

    if settings.telemetry().prometheus_enabled {
        app = app.route("/metrics", get(handlers::metrics));
    }

    let cors = cors_layer(settings);

    app.layer(NormalizePathLayer::trim_trailing_slash())
        .layer(PropagateRequestIdLayer::new(REQUEST_ID))
        .layer(SetRequestIdLayer::new(REQUEST_ID, MakeRequestUuid))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(request_span)
                .on_response(record_response),
        )
        .layer(cors)
        .with_state(state)
}

fn portal_api() -> Router<AppState> {
    let admin = Router::new()
        .nest("/marks", marks::router())
        .nest("/students", students::router())
        .nest("/exams", exams::router())
        .nest("/results", results::router());

    Router::new().nest("/admin", admin).merge(setup::router())
}

fn request_span(request: &Request<Body>) -> Span {
    let request_id =
        request.headers().get(REQUEST_ID).and_then(|value| value.to_str().ok()).unwrap_or("-");
    tracing::info_span!(
        "request",
        method = %request.method(),
        path = %request.uri().path(),
        request_id = %request_id
    )
}

fn record_response(response: &Response<Body>, latency: Duration, _span: &Span) {
    let status = response.status().as_u16().to_string();
    metrics::counter!("http_requests_total", "status" => status.clone()).increment(1);
    metrics::histogram!("http_request_duration_seconds", "status" => status)
        .record(latency.as_secs_f64());
}

/// The portal frontends read and submit marks; nothing here needs PUT or DELETE.
fn cors_layer(settings: &Settings) -> CorsLayer {
    let origins: Vec<HeaderValue> = settings
        .cors()
        .origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(%origin, "Ignoring unusable CORS origin");
                None
            }
        })
        .collect();

    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::HEAD, Method::OPTIONS])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE, ACCEPT, ORIGIN, REQUEST_ID])
        .expose_headers([REQUEST_ID])
        .max_age(Duration::from_secs(60 * 60));

    if origins.is_empty() {
        layer.allow_origin(Any)
    } else {
        layer.allow_credentials(true).allow_origin(AllowOrigin::list(origins))
    }
}
