use crate::collector::{ResponseCollector, DEFAULT_REDIRECT_STATUS};
use ruleware_engine::action::{int_arg, str_arg};
use ruleware_engine::{Action, Context, EngineError};
use serde_json::Value;
use std::sync::Arc;

/// Queue a response header: `set_header(name, value)`. Context placeholders
/// in either argument are interpolated by the engine before dispatch.
pub struct SetHeader;

impl Action for SetHeader {
    fn kind(&self) -> &'static str {
        "set_header"
    }

    fn execute(&self, args: &[Value], ctx: &mut Context) -> Result<(), EngineError> {
        let name = str_arg(args, 0);
        if name.is_empty() {
            return Ok(());
        }
        let value = str_arg(args, 1);
        collector(ctx, self.kind())?.add_header(name, value);
        Ok(())
    }
}

/// Queue a redirect that replaces the outgoing response:
/// `redirect(url, status = 302)`.
pub struct Redirect;

impl Action for Redirect {
    fn kind(&self) -> &'static str {
        "redirect"
    }

    fn execute(&self, args: &[Value], ctx: &mut Context) -> Result<(), EngineError> {
        let url = str_arg(args, 0);
        if url.is_empty() {
            return Ok(());
        }
        let status = int_arg(args, 1, i64::from(DEFAULT_REDIRECT_STATUS));
        let status = u16::try_from(status).unwrap_or(DEFAULT_REDIRECT_STATUS);
        collector(ctx, self.kind())?.set_redirect_with_status(url, status);
        Ok(())
    }
}

fn collector(ctx: &Context, kind: &str) -> Result<Arc<ResponseCollector>, EngineError> {
    ctx.extensions()
        .get::<ResponseCollector>()
        .ok_or_else(|| EngineError::Action {
            kind: kind.to_string(),
            message: "no response collector in this context".to_string(),
        })
}
