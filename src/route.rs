use crate::config::RulewareConfig;
use axum::extract::{MatchedPath, RawPathParams};
use axum::http::Method;
use ruleware_engine::ContextProvider;
use serde_json::{json, Value};
use std::collections::HashMap;

/// Route metadata captured from the matched axum route before the inner
/// handler consumes the request.
#[derive(Debug, Clone, Default)]
pub struct RouteInfo {
    /// Configured name for the matched pattern, empty when unmapped.
    pub name: String,
    /// The matched path pattern, e.g. `/docs/{product}`.
    pub path: String,
    pub method: String,
    pub parameters: HashMap<String, String>,
}

impl RouteInfo {
    pub fn capture(
        config: &RulewareConfig,
        matched: Option<&MatchedPath>,
        params: Option<&RawPathParams>,
        method: &Method,
    ) -> Self {
        let path = matched.map(|m| m.as_str().to_string()).unwrap_or_default();
        let name = config.route_name(&path).unwrap_or_default().to_string();
        let parameters = params
            .map(|params| {
                params
                    .into_iter()
                    .map(|(key, value)| (key.to_string(), value.to_string()))
                    .collect()
            })
            .unwrap_or_default();

        RouteInfo {
            name,
            path,
            method: method.to_string(),
            parameters,
        }
    }
}

/// Exposes the matched route to conditions under the `route` context key.
/// Unavailable when no route matched (static fallback, 404).
pub struct RouteContext {
    info: RouteInfo,
}

impl RouteContext {
    pub fn new(info: RouteInfo) -> Self {
        RouteContext { info }
    }
}

impl ContextProvider for RouteContext {
    fn key(&self) -> &str {
        "route"
    }

    fn is_available(&self) -> bool {
        !self.info.path.is_empty()
    }

    fn build(&self) -> Value {
        json!({
            "name": self.info.name,
            "path": self.info.path,
            "method": self.info.method,
            "parameters": self.info.parameters,
        })
    }
}
