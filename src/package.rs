use crate::actions::{Redirect, SetHeader};
use crate::conditions::{RouteName, RouteParameter, RoutePath};
use ruleware_engine::{Package, Registry, RuleBuilder};
use serde_json::{json, Value};
use std::sync::Arc;

/// Route-aware conditions and response actions for the HTTP pipeline.
pub struct HttpPackage;

impl Package for HttpPackage {
    fn name(&self) -> &'static str {
        "http"
    }

    fn required_packages(&self) -> Vec<&'static str> {
        vec!["core"]
    }

    fn register(&self, registry: &mut Registry) {
        registry.register_condition(Arc::new(RouteName));
        registry.register_condition(Arc::new(RoutePath));
        registry.register_condition(Arc::new(RouteParameter));
        registry.register_action(Arc::new(SetHeader));
        registry.register_action(Arc::new(Redirect));
    }
}

/// Builder shorthands for this package's conditions and actions:
///
/// ```
/// use ruleware::package::RuleBuilderExt;
/// use ruleware_engine::Rule;
///
/// let rule = Rule::builder("docs-redirect")
///     .route_name("docs.show")
///     .redirect_with_status("/new-path", 301)
///     .build();
/// ```
pub trait RuleBuilderExt: Sized {
    fn route_name(self, name: &str) -> Self;
    fn route_name_like(self, pattern: &str) -> Self;
    fn route_path(self, path: &str) -> Self;
    fn route_parameter(self, name: &str) -> Self;
    fn route_parameter_eq(self, name: &str, value: &str) -> Self;
    fn set_header(self, name: &str, value: &str) -> Self;
    fn redirect(self, url: &str) -> Self;
    fn redirect_with_status(self, url: &str, status: u16) -> Self;
}

impl RuleBuilderExt for RuleBuilder {
    fn route_name(self, name: &str) -> Self {
        self.condition("route_name", name)
    }

    fn route_name_like(self, pattern: &str) -> Self {
        self.condition_op("route_name", pattern, "LIKE")
    }

    fn route_path(self, path: &str) -> Self {
        self.condition("route_path", path)
    }

    fn route_parameter(self, name: &str) -> Self {
        self.named_condition("route_parameter", name, None)
    }

    fn route_parameter_eq(self, name: &str, value: &str) -> Self {
        self.named_condition("route_parameter", name, Some(Value::from(value)))
    }

    fn set_header(self, name: &str, value: &str) -> Self {
        self.action("set_header", vec![json!(name), json!(value)])
    }

    fn redirect(self, url: &str) -> Self {
        self.action("redirect", vec![json!(url)])
    }

    fn redirect_with_status(self, url: &str, status: u16) -> Self {
        self.action("redirect", vec![json!(url), json!(status)])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ruleware_engine::{CorePackage, PackageManager, Rule};

    #[test]
    fn test_http_package_registers_handlers() {
        let mut manager = PackageManager::new();
        manager.register(Box::new(CorePackage));
        manager.register(Box::new(HttpPackage));

        let engine = manager.load(&["http"]).unwrap();

        assert_eq!(engine.loaded_packages(), ["core", "http"]);
        assert_eq!(
            engine.registry().condition_kinds(),
            vec!["context_value", "route_name", "route_parameter", "route_path"]
        );
        assert_eq!(engine.registry().action_kinds(), vec!["log", "redirect", "set_header"]);
    }

    #[test]
    fn test_builder_ext_shorthands() {
        let rule = Rule::builder("docs")
            .route_name_like("docs.*")
            .route_parameter_eq("product", "millicache")
            .set_header("X-Docs", "yes")
            .redirect_with_status("/new", 301)
            .build();

        assert_eq!(rule.conditions.len(), 2);
        assert_eq!(rule.conditions[0].kind, "route_name");
        assert_eq!(rule.conditions[0].operator.as_deref(), Some("LIKE"));
        assert_eq!(rule.conditions[1].name.as_deref(), Some("product"));
        assert_eq!(rule.actions.len(), 2);
        assert_eq!(rule.actions[1].args, vec![json!("/new"), json!(301)]);
    }
}
