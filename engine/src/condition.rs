use crate::context::{value_text, Context};
use crate::engine::EngineError;
use crate::rule::ConditionDef;
use regex_lite::Regex;
use serde_json::Value;

/// A predicate source: given a definition and the request context, produce
/// the actual value the engine compares against the expected one.
pub trait Condition: Send + Sync {
    fn kind(&self) -> &'static str;

    fn actual(&self, def: &ConditionDef, ctx: &mut Context) -> Value;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Eq,
    Ne,
    Like,
    Regexp,
    In,
    Exists,
    NotExists,
}

impl Operator {
    pub fn parse(raw: &str) -> Result<Self, EngineError> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "=" | "==" => Ok(Operator::Eq),
            "!=" | "<>" => Ok(Operator::Ne),
            "LIKE" => Ok(Operator::Like),
            "REGEXP" => Ok(Operator::Regexp),
            "IN" => Ok(Operator::In),
            "EXISTS" => Ok(Operator::Exists),
            "NOT EXISTS" => Ok(Operator::NotExists),
            other => Err(EngineError::InvalidOperator(other.to_string())),
        }
    }

    /// Operator for a definition: explicit if given, `=` when a value is
    /// present, otherwise an existence check.
    pub fn for_def(def: &ConditionDef) -> Result<Self, EngineError> {
        match &def.operator {
            Some(raw) => Self::parse(raw),
            None if def.value.is_some() => Ok(Operator::Eq),
            None => Ok(Operator::Exists),
        }
    }
}

pub fn compare(actual: &Value, operator: Operator, expected: &Value) -> Result<bool, EngineError> {
    match operator {
        Operator::Eq => Ok(loose_eq(actual, expected)),
        Operator::Ne => Ok(!loose_eq(actual, expected)),
        Operator::Like => Ok(like_match(&value_text(expected), &value_text(actual))),
        Operator::Regexp => {
            let pattern = value_text(expected);
            let re = Regex::new(&pattern).map_err(|e| EngineError::Pattern {
                pattern: pattern.clone(),
                message: e.to_string(),
            })?;
            Ok(re.is_match(&value_text(actual)))
        }
        Operator::In => match expected {
            Value::Array(items) => Ok(items.iter().any(|item| loose_eq(actual, item))),
            other => Ok(loose_eq(actual, other)),
        },
        Operator::Exists => Ok(!actual.is_null()),
        Operator::NotExists => Ok(actual.is_null()),
    }
}

/// Scalar equality across TOML/JSON type boundaries: `"301"` and `301`
/// compare equal, but nothing compares equal to an absent value.
fn loose_eq(a: &Value, b: &Value) -> bool {
    if a == b {
        return true;
    }
    if a.is_null() || b.is_null() {
        return false;
    }
    value_text(a) == value_text(b)
}

/// SQL-style wildcard match: `*` spans any run of characters, everything
/// else is literal, case-insensitive.
pub fn like_match(pattern: &str, text: &str) -> bool {
    let mut re = String::from("(?i)^");
    for (i, part) in pattern.split('*').enumerate() {
        if i > 0 {
            re.push_str(".*");
        }
        re.push_str(&regex_lite::escape(part));
    }
    re.push('$');
    Regex::new(&re).map(|re| re.is_match(text)).unwrap_or(false)
}

/// Generic condition over any dotted context path, named by `name`.
pub struct ContextValue;

impl Condition for ContextValue {
    fn kind(&self) -> &'static str {
        "context_value"
    }

    fn actual(&self, def: &ConditionDef, ctx: &mut Context) -> Value {
        match def.name.as_deref() {
            Some(path) => ctx.get(path),
            None => Value::Null,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_operator_parse() {
        assert_eq!(Operator::parse("=").unwrap(), Operator::Eq);
        assert_eq!(Operator::parse("!=").unwrap(), Operator::Ne);
        assert_eq!(Operator::parse("like").unwrap(), Operator::Like);
        assert_eq!(Operator::parse("NOT EXISTS").unwrap(), Operator::NotExists);
        assert!(Operator::parse("~").is_err());
    }

    #[test]
    fn test_operator_defaults() {
        let with_value = ConditionDef {
            kind: "route_name".to_string(),
            name: None,
            value: Some(json!("docs.show")),
            operator: None,
        };
        let without_value = ConditionDef {
            kind: "route_parameter".to_string(),
            name: Some("product".to_string()),
            value: None,
            operator: None,
        };
        assert_eq!(Operator::for_def(&with_value).unwrap(), Operator::Eq);
        assert_eq!(Operator::for_def(&without_value).unwrap(), Operator::Exists);
    }

    #[test]
    fn test_compare_eq_is_loose() {
        assert!(compare(&json!("docs.show"), Operator::Eq, &json!("docs.show")).unwrap());
        assert!(compare(&json!("301"), Operator::Eq, &json!(301)).unwrap());
        assert!(!compare(&json!("a"), Operator::Eq, &json!("b")).unwrap());
        assert!(!compare(&Value::Null, Operator::Eq, &json!("")).unwrap());
    }

    #[test]
    fn test_compare_like() {
        assert!(compare(&json!("docs.show"), Operator::Like, &json!("docs.*")).unwrap());
        assert!(compare(&json!("DOCS.SHOW"), Operator::Like, &json!("docs.*")).unwrap());
        assert!(!compare(&json!("blog.show"), Operator::Like, &json!("docs.*")).unwrap());
        assert!(compare(&json!("exact"), Operator::Like, &json!("exact")).unwrap());
    }

    #[test]
    fn test_compare_regexp() {
        assert!(compare(&json!("docs.show"), Operator::Regexp, &json!("^docs\\.")).unwrap());
        assert!(!compare(&json!("blog.show"), Operator::Regexp, &json!("^docs\\.")).unwrap());
        assert!(compare(&json!("x"), Operator::Regexp, &json!("[")).is_err());
    }

    #[test]
    fn test_compare_in() {
        let expected = json!(["alpha", "beta"]);
        assert!(compare(&json!("alpha"), Operator::In, &expected).unwrap());
        assert!(!compare(&json!("gamma"), Operator::In, &expected).unwrap());
        assert!(compare(&json!("solo"), Operator::In, &json!("solo")).unwrap());
    }

    #[test]
    fn test_compare_exists() {
        assert!(compare(&json!("anything"), Operator::Exists, &Value::Null).unwrap());
        assert!(!compare(&Value::Null, Operator::Exists, &Value::Null).unwrap());
        assert!(compare(&Value::Null, Operator::NotExists, &Value::Null).unwrap());
    }

    #[test]
    fn test_like_match_literal_metacharacters() {
        assert!(like_match("/docs/*", "/docs/install"));
        assert!(!like_match("/docs/*", "/blog/install"));
        assert!(like_match("a+b", "a+b"));
        assert!(!like_match("a+b", "aab"));
    }

    #[test]
    fn test_context_value_condition() {
        let mut ctx = Context::new();
        ctx.set("route", json!({"method": "GET"}));

        let def = ConditionDef {
            kind: "context_value".to_string(),
            name: Some("route.method".to_string()),
            value: Some(json!("GET")),
            operator: None,
        };
        assert_eq!(ContextValue.actual(&def, &mut ctx), json!("GET"));

        let nameless = ConditionDef {
            kind: "context_value".to_string(),
            name: None,
            value: None,
            operator: None,
        };
        assert_eq!(ContextValue.actual(&nameless, &mut ctx), Value::Null);
    }
}
