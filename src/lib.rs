pub mod actions;
pub mod bootstrap;
pub mod collector;
pub mod conditions;
pub mod config;
pub mod middleware;
pub mod package;
pub mod route;
pub mod scaffold;

pub use bootstrap::{BootstrapError, Ruleware, APP_PACKAGE};
pub use collector::{ResponseCollector, DEFAULT_REDIRECT_STATUS};
pub use config::{ConfigError, MiddlewareConfig, RulewareConfig};
pub use middleware::execute_rules;
pub use package::{HttpPackage, RuleBuilderExt};
pub use route::{RouteContext, RouteInfo};
pub use scaffold::{ScaffoldError, Scaffolder};
