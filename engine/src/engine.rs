use crate::condition::{compare, Operator};
use crate::context::Context;
use crate::registry::Registry;
use crate::rule::{ActionDef, ConditionDef, MatchType, Rule};
use serde_json::Value;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("unknown condition type: {0}")]
    UnknownCondition(String),
    #[error("unknown action type: {0}")]
    UnknownAction(String),
    #[error("unknown package: {0}")]
    UnknownPackage(String),
    #[error("package not available: {0}")]
    PackageUnavailable(String),
    #[error("package requirement cycle involving: {0}")]
    PackageCycle(String),
    #[error("invalid operator: {0}")]
    InvalidOperator(String),
    #[error("invalid pattern {pattern}: {message}")]
    Pattern { pattern: String, message: String },
    #[error("action {kind} failed: {message}")]
    Action { kind: String, message: String },
}

#[derive(Debug, Clone, Default)]
pub struct ExecutionReport {
    pub evaluated: usize,
    pub matched: Vec<String>,
}

/// Holds the loaded registries and rules; executes a single ordered pass
/// over all enabled rules for one request context.
#[derive(Default)]
pub struct RuleEngine {
    registry: Registry,
    rules: Vec<Rule>,
    loaded: Vec<String>,
}

impl std::fmt::Debug for RuleEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuleEngine")
            .field("rules", &self.rules.len())
            .field("loaded", &self.loaded)
            .finish()
    }
}

impl RuleEngine {
    pub fn new() -> Self {
        RuleEngine::default()
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut Registry {
        &mut self.registry
    }

    pub fn add_rule(&mut self, package: &str, mut rule: Rule) {
        rule.package = Some(package.to_string());
        self.rules.push(rule);
    }

    pub fn add_rules(&mut self, package: &str, rules: Vec<Rule>) {
        for rule in rules {
            self.add_rule(package, rule);
        }
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn rule(&self, id: &str) -> Option<&Rule> {
        self.rules.iter().find(|rule| rule.id == id)
    }

    pub fn loaded_packages(&self) -> &[String] {
        &self.loaded
    }

    pub fn is_loaded(&self, name: &str) -> bool {
        self.loaded.iter().any(|loaded| loaded == name)
    }

    pub(crate) fn mark_loaded(&mut self, name: &str) {
        self.loaded.push(name.to_string());
    }

    /// Evaluate every enabled rule in ascending order and run the actions of
    /// those that match. Single pass, no retries; the first error aborts and
    /// propagates to the caller.
    pub fn execute(&self, ctx: &mut Context) -> Result<ExecutionReport, EngineError> {
        let mut ordered: Vec<&Rule> = self.rules.iter().collect();
        ordered.sort_by_key(|rule| rule.order);

        let mut report = ExecutionReport::default();
        for rule in ordered {
            if !rule.enabled {
                continue;
            }
            report.evaluated += 1;
            if self.matches(rule, ctx)? {
                for def in &rule.actions {
                    self.run_action(def, ctx)?;
                }
                report.matched.push(rule.id.clone());
            }
        }
        Ok(report)
    }

    fn matches(&self, rule: &Rule, ctx: &mut Context) -> Result<bool, EngineError> {
        if rule.conditions.is_empty() {
            return Ok(true);
        }
        match rule.match_type {
            MatchType::All => {
                for def in &rule.conditions {
                    if !self.evaluate(def, ctx)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
            MatchType::Any => {
                for def in &rule.conditions {
                    if self.evaluate(def, ctx)? {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
        }
    }

    fn evaluate(&self, def: &ConditionDef, ctx: &mut Context) -> Result<bool, EngineError> {
        let handler = self
            .registry
            .condition(&def.kind)
            .ok_or_else(|| EngineError::UnknownCondition(def.kind.clone()))?;
        let operator = Operator::for_def(def)?;
        let actual = handler.actual(def, ctx);
        let expected = match &def.value {
            Some(Value::String(s)) => Value::String(ctx.interpolate(s)),
            Some(other) => other.clone(),
            None => Value::Null,
        };
        compare(&actual, operator, &expected)
    }

    fn run_action(&self, def: &ActionDef, ctx: &mut Context) -> Result<(), EngineError> {
        let handler = self
            .registry
            .action(&def.kind)
            .ok_or_else(|| EngineError::UnknownAction(def.kind.clone()))?;
        let args: Vec<Value> = def
            .args
            .iter()
            .map(|arg| match arg {
                Value::String(s) => Value::String(ctx.interpolate(s)),
                other => other.clone(),
            })
            .collect();
        handler.execute(&args, ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::{str_arg, Action};
    use crate::condition::ContextValue;
    use serde_json::json;
    use std::sync::{Arc, Mutex};

    struct Record(Arc<Mutex<Vec<String>>>);

    impl Action for Record {
        fn kind(&self) -> &'static str {
            "record"
        }

        fn execute(&self, args: &[Value], _ctx: &mut Context) -> Result<(), EngineError> {
            self.0.lock().unwrap().push(str_arg(args, 0));
            Ok(())
        }
    }

    struct Explode;

    impl Action for Explode {
        fn kind(&self) -> &'static str {
            "explode"
        }

        fn execute(&self, _args: &[Value], _ctx: &mut Context) -> Result<(), EngineError> {
            Err(EngineError::Action {
                kind: "explode".to_string(),
                message: "boom".to_string(),
            })
        }
    }

    fn test_engine(log: Arc<Mutex<Vec<String>>>) -> RuleEngine {
        let mut engine = RuleEngine::new();
        engine.registry_mut().register_condition(Arc::new(ContextValue));
        engine.registry_mut().register_action(Arc::new(Record(log)));
        engine.registry_mut().register_action(Arc::new(Explode));
        engine
    }

    fn route_ctx() -> Context {
        let mut ctx = Context::new();
        ctx.set(
            "route",
            json!({"name": "docs.show", "parameters": {"product": "millicache"}}),
        );
        ctx
    }

    #[test]
    fn test_rules_run_in_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut engine = test_engine(log.clone());
        engine.add_rule("app", Rule::builder("late").order(20).action("record", vec![json!("late")]).build());
        engine.add_rule("app", Rule::builder("early").order(1).action("record", vec![json!("early")]).build());
        engine.add_rule("app", Rule::builder("default").action("record", vec![json!("default")]).build());

        let report = engine.execute(&mut route_ctx()).unwrap();

        assert_eq!(report.evaluated, 3);
        assert_eq!(report.matched, vec!["early", "default", "late"]);
        assert_eq!(*log.lock().unwrap(), vec!["early", "default", "late"]);
    }

    #[test]
    fn test_match_all_requires_every_condition() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut engine = test_engine(log.clone());
        engine.add_rule(
            "app",
            Rule::builder("both")
                .named_condition("context_value", "route.name", Some(json!("docs.show")))
                .named_condition("context_value", "route.parameters.product", Some(json!("other")))
                .action("record", vec![json!("both")])
                .build(),
        );

        let report = engine.execute(&mut route_ctx()).unwrap();

        assert!(report.matched.is_empty());
        assert!(log.lock().unwrap().is_empty());
    }

    #[test]
    fn test_match_any_requires_one_condition() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut engine = test_engine(log.clone());
        engine.add_rule(
            "app",
            Rule::builder("either")
                .match_any()
                .named_condition("context_value", "route.name", Some(json!("nope")))
                .named_condition("context_value", "route.parameters.product", Some(json!("millicache")))
                .action("record", vec![json!("either")])
                .build(),
        );

        let report = engine.execute(&mut route_ctx()).unwrap();

        assert_eq!(report.matched, vec!["either"]);
    }

    #[test]
    fn test_disabled_rules_are_skipped() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut engine = test_engine(log.clone());
        engine.add_rule("app", Rule::builder("off").disabled().action("record", vec![json!("off")]).build());

        let report = engine.execute(&mut route_ctx()).unwrap();

        assert_eq!(report.evaluated, 0);
        assert!(log.lock().unwrap().is_empty());
    }

    #[test]
    fn test_action_args_are_interpolated() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut engine = test_engine(log.clone());
        engine.add_rule(
            "app",
            Rule::builder("interp")
                .action("record", vec![json!("/docs/{route.parameters.product}")])
                .build(),
        );

        engine.execute(&mut route_ctx()).unwrap();

        assert_eq!(*log.lock().unwrap(), vec!["/docs/millicache"]);
    }

    #[test]
    fn test_unknown_condition_errors() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut engine = test_engine(log);
        engine.add_rule("app", Rule::builder("bad").condition("no_such", "x").build());

        let err = engine.execute(&mut route_ctx()).unwrap_err();
        assert!(matches!(err, EngineError::UnknownCondition(kind) if kind == "no_such"));
    }

    #[test]
    fn test_unknown_action_errors() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut engine = test_engine(log);
        engine.add_rule("app", Rule::builder("bad").action("no_such", vec![]).build());

        let err = engine.execute(&mut route_ctx()).unwrap_err();
        assert!(matches!(err, EngineError::UnknownAction(kind) if kind == "no_such"));
    }

    #[test]
    fn test_failing_action_aborts_the_pass() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut engine = test_engine(log.clone());
        engine.add_rule("app", Rule::builder("boom").order(1).action("explode", vec![]).build());
        engine.add_rule("app", Rule::builder("after").order(2).action("record", vec![json!("after")]).build());

        assert!(engine.execute(&mut route_ctx()).is_err());
        assert!(log.lock().unwrap().is_empty());
    }

    #[test]
    fn test_rule_lookup_and_package_stamp() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut engine = test_engine(log);
        engine.add_rule("app", Rule::builder("docs-headers").build());

        let rule = engine.rule("docs-headers").unwrap();
        assert_eq!(rule.package.as_deref(), Some("app"));
        assert!(engine.rule("missing").is_none());
    }
}
