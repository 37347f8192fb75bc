use crate::bootstrap::Ruleware;
use crate::collector::ResponseCollector;
use crate::route::{RouteContext, RouteInfo};
use axum::extract::{FromRequestParts, MatchedPath, RawPathParams, Request, State};
use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use ruleware_engine::Context;
use std::sync::Arc;

/// Execute rules after the inner handler and apply collected response
/// modifications.
///
/// Runs after routing, so the matched route is available for condition
/// evaluation. A fresh collector is allocated for each request and handed to
/// actions through the engine context; it drops with this scope, so nothing
/// carries over between requests. A queued redirect replaces the response;
/// queued headers are applied either way. An engine failure becomes the
/// transport's standard error response and skips the apply step entirely.
pub async fn execute_rules(
    State(state): State<Arc<Ruleware>>,
    request: Request,
    next: Next,
) -> Response {
    // Extraction failures mean no route matched (static fallback, 404); the
    // route context is simply unavailable then.
    let (mut parts, body) = request.into_parts();
    let matched = parts.extensions.get::<MatchedPath>().cloned();
    let params = RawPathParams::from_request_parts(&mut parts, &()).await.ok();
    let method = parts.method.clone();
    let request = Request::from_parts(parts, body);

    let route = RouteInfo::capture(&state.config, matched.as_ref(), params.as_ref(), &method);
    let response = next.run(request).await;

    let collector = Arc::new(ResponseCollector::new());
    let mut ctx = Context::new();
    ctx.register(Box::new(RouteContext::new(route)));
    ctx.extensions_mut().insert(collector.clone());

    match state.engine.execute(&mut ctx) {
        Ok(report) => {
            tracing::debug!(
                evaluated = report.evaluated,
                matched = ?report.matched,
                "rules executed"
            );
            apply_modifications(&collector, response)
        }
        Err(err) => {
            tracing::error!(error = %err, "rule execution failed");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// A queued redirect replaces the response entirely; headers are then
/// applied on top of whichever response survives. Names or values the
/// transport layer rejects are skipped here, the first place they are
/// validated at all.
fn apply_modifications(collector: &ResponseCollector, response: Response) -> Response {
    let mut response = collector.replacement().unwrap_or(response);
    for (name, value) in collector.headers() {
        match (
            HeaderName::try_from(name.as_str()),
            HeaderValue::try_from(value.as_str()),
        ) {
            (Ok(name), Ok(value)) => {
                response.headers_mut().insert(name, value);
            }
            _ => tracing::warn!(name = %name, "header rejected by the transport layer"),
        }
    }
    response
}
