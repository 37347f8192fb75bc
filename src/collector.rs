use axum::body::Body;
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::Response;
use parking_lot::Mutex;
use std::collections::HashMap;

pub const DEFAULT_REDIRECT_STATUS: u16 = 302;

/// Queued response modifications for one request cycle.
///
/// Actions write here during rule execution; the middleware reads the
/// collected state and applies it to the outgoing response. One collector is
/// allocated per request and shared with action handlers through the engine
/// context, so concurrent requests never see each other's queue.
#[derive(Debug, Default)]
pub struct ResponseCollector {
    inner: Mutex<Collected>,
}

#[derive(Debug, Default)]
struct Collected {
    headers: HashMap<String, String>,
    redirect: Option<(String, u16)>,
}

impl ResponseCollector {
    pub fn new() -> Self {
        ResponseCollector::default()
    }

    /// Queue a header write. A later write to the same name overwrites the
    /// earlier one.
    pub fn add_header(&self, name: impl Into<String>, value: impl Into<String>) {
        self.inner.lock().headers.insert(name.into(), value.into());
    }

    /// Queue a 302 redirect that replaces the outgoing response.
    pub fn set_redirect(&self, url: impl Into<String>) {
        self.set_redirect_with_status(url, DEFAULT_REDIRECT_STATUS);
    }

    /// Queue a redirect with an explicit status. A later redirect overwrites
    /// an earlier one; queued headers are unaffected either way.
    pub fn set_redirect_with_status(&self, url: impl Into<String>, status: u16) {
        self.inner.lock().redirect = Some((url.into(), status));
    }

    /// Whether a queued redirect will replace the response.
    pub fn has_replacement(&self) -> bool {
        self.inner.lock().redirect.is_some()
    }

    /// Build the replacement redirect response, if one is queued. The URL
    /// and status are taken as given; values the transport layer rejects are
    /// resolved here, not at queue time.
    pub fn replacement(&self) -> Option<Response> {
        let (url, status) = self.inner.lock().redirect.clone()?;

        let mut response = Response::new(Body::empty());
        *response.status_mut() = StatusCode::from_u16(status).unwrap_or(StatusCode::FOUND);
        match HeaderValue::try_from(url.as_str()) {
            Ok(location) => {
                response.headers_mut().insert(header::LOCATION, location);
            }
            Err(_) => tracing::warn!(url = %url, "redirect target rejected by the transport layer"),
        }
        Some(response)
    }

    /// Snapshot of the queued headers.
    pub fn headers(&self) -> HashMap<String, String> {
        self.inner.lock().headers.clone()
    }

    /// Reset all queued state.
    pub fn clear(&self) {
        let mut inner = self.inner.lock();
        inner.headers.clear();
        inner.redirect = None;
    }
}
