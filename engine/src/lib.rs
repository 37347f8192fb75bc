pub mod action;
pub mod condition;
pub mod context;
pub mod engine;
pub mod loader;
pub mod package;
pub mod registry;
pub mod rule;

pub use action::Action;
pub use condition::{compare, Condition, Operator};
pub use context::{value_text, Context, ContextProvider, Extensions};
pub use engine::{EngineError, ExecutionReport, RuleEngine};
pub use loader::{rules_from_file, rules_from_toml, LoadError};
pub use package::{CorePackage, Package, PackageManager};
pub use registry::Registry;
pub use rule::{ActionDef, ConditionDef, MatchType, Rule, RuleBuilder};
