use crate::context::{value_text, Context};
use crate::engine::EngineError;
use serde_json::Value;

/// A unit of behavior executed when a rule matches. String args are
/// interpolated against the context before dispatch.
pub trait Action: Send + Sync {
    fn kind(&self) -> &'static str;

    fn execute(&self, args: &[Value], ctx: &mut Context) -> Result<(), EngineError>;
}

/// Positional string argument, empty when absent.
pub fn str_arg(args: &[Value], index: usize) -> String {
    args.get(index).map(value_text).unwrap_or_default()
}

/// Positional integer argument, with numeric strings accepted.
pub fn int_arg(args: &[Value], index: usize, default: i64) -> i64 {
    match args.get(index) {
        Some(Value::Number(n)) => n.as_i64().unwrap_or(default),
        Some(Value::String(s)) => s.parse().unwrap_or(default),
        _ => default,
    }
}

/// Emit a log line: `log(message, level = "info")`.
pub struct Log;

impl Action for Log {
    fn kind(&self) -> &'static str {
        "log"
    }

    fn execute(&self, args: &[Value], _ctx: &mut Context) -> Result<(), EngineError> {
        let message = str_arg(args, 0);
        match str_arg(args, 1).to_ascii_lowercase().as_str() {
            "debug" => tracing::debug!("{}", message),
            "warn" => tracing::warn!("{}", message),
            "error" => tracing::error!("{}", message),
            _ => tracing::info!("{}", message),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_str_arg() {
        let args = vec![json!("X-Custom"), json!(301)];
        assert_eq!(str_arg(&args, 0), "X-Custom");
        assert_eq!(str_arg(&args, 1), "301");
        assert_eq!(str_arg(&args, 2), "");
    }

    #[test]
    fn test_int_arg() {
        let args = vec![json!("/new-path"), json!(301), json!("308"), json!("nope")];
        assert_eq!(int_arg(&args, 1, 302), 301);
        assert_eq!(int_arg(&args, 2, 302), 308);
        assert_eq!(int_arg(&args, 3, 302), 302);
        assert_eq!(int_arg(&args, 9, 302), 302);
    }

    #[test]
    fn test_log_action_never_fails() {
        let mut ctx = Context::new();
        assert!(Log.execute(&[json!("hello"), json!("debug")], &mut ctx).is_ok());
        assert!(Log.execute(&[], &mut ctx).is_ok());
    }
}
