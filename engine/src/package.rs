use crate::action::Log;
use crate::condition::ContextValue;
use crate::engine::{EngineError, RuleEngine};
use crate::registry::Registry;
use crate::rule::Rule;
use std::sync::Arc;

/// A named bundle of condition/action handlers and rules. Packages declare
/// what they require and whether the current environment supports them.
pub trait Package: Send + Sync {
    fn name(&self) -> &'static str;

    fn required_packages(&self) -> Vec<&'static str> {
        Vec::new()
    }

    fn is_available(&self) -> bool {
        true
    }

    fn register(&self, registry: &mut Registry);

    fn rules(&self) -> Vec<Rule> {
        Vec::new()
    }
}

/// Engine-generic handlers with no framework ties.
pub struct CorePackage;

impl Package for CorePackage {
    fn name(&self) -> &'static str {
        "core"
    }

    fn register(&self, registry: &mut Registry) {
        registry.register_condition(Arc::new(ContextValue));
        registry.register_action(Arc::new(Log));
    }
}

/// Registered packages, loadable into a `RuleEngine`. Requirements resolve
/// depth-first; loading is idempotent per package.
#[derive(Default)]
pub struct PackageManager {
    packages: Vec<Box<dyn Package>>,
}

impl PackageManager {
    pub fn new() -> Self {
        PackageManager::default()
    }

    pub fn register(&mut self, package: Box<dyn Package>) {
        self.packages.push(package);
    }

    pub fn packages(&self) -> &[Box<dyn Package>] {
        &self.packages
    }

    pub fn get(&self, name: &str) -> Option<&dyn Package> {
        self.packages
            .iter()
            .find(|package| package.name() == name)
            .map(Box::as_ref)
    }

    pub fn load(&self, names: &[&str]) -> Result<RuleEngine, EngineError> {
        let mut engine = RuleEngine::new();
        for name in names {
            self.load_into(name, &mut engine, &mut Vec::new())?;
        }
        Ok(engine)
    }

    fn load_into(
        &self,
        name: &str,
        engine: &mut RuleEngine,
        visiting: &mut Vec<String>,
    ) -> Result<(), EngineError> {
        if engine.is_loaded(name) {
            return Ok(());
        }
        if visiting.iter().any(|seen| seen == name) {
            return Err(EngineError::PackageCycle(name.to_string()));
        }

        let package = self
            .get(name)
            .ok_or_else(|| EngineError::UnknownPackage(name.to_string()))?;
        if !package.is_available() {
            return Err(EngineError::PackageUnavailable(name.to_string()));
        }

        visiting.push(name.to_string());
        for required in package.required_packages() {
            self.load_into(required, engine, visiting)?;
        }
        visiting.pop();

        package.register(engine.registry_mut());
        engine.add_rules(name, package.rules());
        engine.mark_loaded(name);
        Ok(())
    }
}
