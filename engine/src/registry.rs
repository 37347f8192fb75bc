use crate::action::Action;
use crate::condition::Condition;
use std::collections::HashMap;
use std::sync::Arc;

/// Static maps from type identifier to handler, populated at startup by
/// package registration. Unknown kinds surface as engine errors at
/// evaluation time.
#[derive(Default)]
pub struct Registry {
    conditions: HashMap<&'static str, Arc<dyn Condition>>,
    actions: HashMap<&'static str, Arc<dyn Action>>,
}

impl Registry {
    pub fn new() -> Self {
        Registry::default()
    }

    pub fn register_condition(&mut self, handler: Arc<dyn Condition>) {
        self.conditions.insert(handler.kind(), handler);
    }

    pub fn register_action(&mut self, handler: Arc<dyn Action>) {
        self.actions.insert(handler.kind(), handler);
    }

    pub fn condition(&self, kind: &str) -> Option<&Arc<dyn Condition>> {
        self.conditions.get(kind)
    }

    pub fn action(&self, kind: &str) -> Option<&Arc<dyn Action>> {
        self.actions.get(kind)
    }

    pub fn condition_kinds(&self) -> Vec<&'static str> {
        let mut kinds: Vec<_> = self.conditions.keys().copied().collect();
        kinds.sort_unstable();
        kinds
    }

    pub fn action_kinds(&self) -> Vec<&'static str> {
        let mut kinds: Vec<_> = self.actions.keys().copied().collect();
        kinds.sort_unstable();
        kinds
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::Log;
    use crate::condition::ContextValue;

    #[test]
    fn test_register_and_look_up() {
        let mut registry = Registry::new();
        registry.register_condition(Arc::new(ContextValue));
        registry.register_action(Arc::new(Log));

        assert!(registry.condition("context_value").is_some());
        assert!(registry.condition("route_name").is_none());
        assert!(registry.action("log").is_some());
        assert!(registry.action("redirect").is_none());
    }

    #[test]
    fn test_kinds_are_sorted() {
        let mut registry = Registry::new();
        registry.register_action(Arc::new(Log));
        registry.register_condition(Arc::new(ContextValue));

        assert_eq!(registry.condition_kinds(), vec!["context_value"]);
        assert_eq!(registry.action_kinds(), vec!["log"]);
    }
}
