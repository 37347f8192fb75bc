use ruleware_engine::{Condition, ConditionDef, Context};
use serde_json::Value;

/// Matches the configured name of the current route.
///
/// ```toml
/// [[rules.conditions]]
/// type = "route_name"
/// value = "docs.*"
/// operator = "LIKE"
/// ```
pub struct RouteName;

impl Condition for RouteName {
    fn kind(&self) -> &'static str {
        "route_name"
    }

    fn actual(&self, _def: &ConditionDef, ctx: &mut Context) -> Value {
        ctx.get("route.name")
    }
}

/// Matches the path pattern of the current route, e.g. `/docs/{product}`.
pub struct RoutePath;

impl Condition for RoutePath {
    fn kind(&self) -> &'static str {
        "route_path"
    }

    fn actual(&self, _def: &ConditionDef, ctx: &mut Context) -> Value {
        ctx.get("route.path")
    }
}

/// Matches a named route parameter. With no expected value the condition is
/// an existence check.
pub struct RouteParameter;

impl Condition for RouteParameter {
    fn kind(&self) -> &'static str {
        "route_parameter"
    }

    fn actual(&self, def: &ConditionDef, ctx: &mut Context) -> Value {
        match def.name.as_deref() {
            Some(name) => ctx.get(&format!("route.parameters.{name}")),
            None => Value::Null,
        }
    }
}
