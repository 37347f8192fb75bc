use serde::Deserialize;
use serde_json::Value;

/// How a rule's conditions combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchType {
    #[default]
    All,
    Any,
}

/// A single condition entry in a rule definition.
#[derive(Debug, Clone, Deserialize)]
pub struct ConditionDef {
    #[serde(rename = "type")]
    pub kind: String,
    /// Selector for name-based conditions, e.g. a route parameter name.
    #[serde(default)]
    pub name: Option<String>,
    /// Expected value; absent means an existence check.
    #[serde(default)]
    pub value: Option<Value>,
    /// Comparison operator; defaults to `=` when a value is present.
    #[serde(default)]
    pub operator: Option<String>,
}

/// A single action entry in a rule definition.
#[derive(Debug, Clone, Deserialize)]
pub struct ActionDef {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub args: Vec<Value>,
}

/// A named, orderable unit of conditions and actions. Rules execute in
/// ascending `order`; ties keep registration order.
#[derive(Debug, Clone, Deserialize)]
pub struct Rule {
    pub id: String,
    #[serde(default = "default_order")]
    pub order: i32,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(rename = "match", default)]
    pub match_type: MatchType,
    #[serde(default)]
    pub conditions: Vec<ConditionDef>,
    #[serde(default)]
    pub actions: Vec<ActionDef>,
    /// Owning package, stamped when the rule is added to an engine.
    #[serde(skip)]
    pub package: Option<String>,
}

fn default_order() -> i32 {
    10
}

fn default_enabled() -> bool {
    true
}

impl Rule {
    pub fn builder(id: impl Into<String>) -> RuleBuilder {
        RuleBuilder {
            rule: Rule {
                id: id.into(),
                order: default_order(),
                enabled: default_enabled(),
                match_type: MatchType::All,
                conditions: Vec::new(),
                actions: Vec::new(),
                package: None,
            },
        }
    }
}

/// Fluent construction of rules from code, the counterpart of the TOML
/// definition format.
pub struct RuleBuilder {
    rule: Rule,
}

impl RuleBuilder {
    pub fn order(mut self, order: i32) -> Self {
        self.rule.order = order;
        self
    }

    pub fn disabled(mut self) -> Self {
        self.rule.enabled = false;
        self
    }

    pub fn match_any(mut self) -> Self {
        self.rule.match_type = MatchType::Any;
        self
    }

    pub fn condition(self, kind: impl Into<String>, value: impl Into<Value>) -> Self {
        self.push_condition(ConditionDef {
            kind: kind.into(),
            name: None,
            value: Some(value.into()),
            operator: None,
        })
    }

    pub fn condition_op(
        self,
        kind: impl Into<String>,
        value: impl Into<Value>,
        operator: impl Into<String>,
    ) -> Self {
        self.push_condition(ConditionDef {
            kind: kind.into(),
            name: None,
            value: Some(value.into()),
            operator: Some(operator.into()),
        })
    }

    /// Name-based condition: `name` selects what to inspect; a `None` value
    /// makes it an existence check.
    pub fn named_condition(
        self,
        kind: impl Into<String>,
        name: impl Into<String>,
        value: Option<Value>,
    ) -> Self {
        self.push_condition(ConditionDef {
            kind: kind.into(),
            name: Some(name.into()),
            value,
            operator: None,
        })
    }

    pub fn action(mut self, kind: impl Into<String>, args: Vec<Value>) -> Self {
        self.rule.actions.push(ActionDef {
            kind: kind.into(),
            args,
        });
        self
    }

    pub fn build(self) -> Rule {
        self.rule
    }

    fn push_condition(mut self, def: ConditionDef) -> Self {
        self.rule.conditions.push(def);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_builder_defaults() {
        let rule = Rule::builder("docs-headers").build();
        assert_eq!(rule.id, "docs-headers");
        assert_eq!(rule.order, 10);
        assert!(rule.enabled);
        assert_eq!(rule.match_type, MatchType::All);
        assert!(rule.conditions.is_empty());
        assert!(rule.actions.is_empty());
    }

    #[test]
    fn test_builder_populates_definitions() {
        let rule = Rule::builder("docs-redirect")
            .order(5)
            .match_any()
            .condition("route_name", "docs.show")
            .condition_op("route_name", "docs.*", "LIKE")
            .named_condition("route_parameter", "product", None)
            .action("redirect", vec![json!("/new-path"), json!(301)])
            .build();

        assert_eq!(rule.order, 5);
        assert_eq!(rule.match_type, MatchType::Any);
        assert_eq!(rule.conditions.len(), 3);
        assert_eq!(rule.conditions[0].kind, "route_name");
        assert_eq!(rule.conditions[1].operator.as_deref(), Some("LIKE"));
        assert_eq!(rule.conditions[2].name.as_deref(), Some("product"));
        assert!(rule.conditions[2].value.is_none());
        assert_eq!(rule.actions[0].kind, "redirect");
        assert_eq!(rule.actions[0].args, vec![json!("/new-path"), json!(301)]);
    }

    #[test]
    fn test_disabled() {
        let rule = Rule::builder("off").disabled().build();
        assert!(!rule.enabled);
    }
}
