use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScaffoldError {
    #[error("{0} already exists")]
    AlreadyExists(PathBuf),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Writes starter rule files and handler sources. Never overwrites.
pub struct Scaffolder {
    rules_dir: PathBuf,
    source_dir: PathBuf,
}

impl Scaffolder {
    pub fn new(rules_dir: PathBuf, source_dir: PathBuf) -> Self {
        Scaffolder {
            rules_dir,
            source_dir,
        }
    }

    /// Create `<rules_dir>/<kebab-name>.toml` with a starter rule.
    pub fn make_rule(&self, name: &str) -> Result<PathBuf, ScaffoldError> {
        let id = to_kebab(name);
        let path = self.rules_dir.join(format!("{id}.toml"));
        self.write_new(&path, &rule_stub(&id))
    }

    /// Create `<source_dir>/<snake-name>.rs` with an `Action` impl.
    pub fn make_action(&self, name: &str) -> Result<PathBuf, ScaffoldError> {
        let path = self.source_dir.join(format!("{}.rs", to_snake(name)));
        self.write_new(&path, &action_stub(&to_pascal(name), &to_snake(name)))
    }

    /// Create `<source_dir>/<snake-name>.rs` with a `Condition` impl.
    pub fn make_condition(&self, name: &str) -> Result<PathBuf, ScaffoldError> {
        let path = self.source_dir.join(format!("{}.rs", to_snake(name)));
        self.write_new(&path, &condition_stub(&to_pascal(name), &to_snake(name)))
    }

    fn write_new(&self, path: &Path, content: &str) -> Result<PathBuf, ScaffoldError> {
        if path.exists() {
            return Err(ScaffoldError::AlreadyExists(path.to_path_buf()));
        }
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        Ok(path.to_path_buf())
    }
}

pub fn rule_stub(id: &str) -> String {
    format!(
        r#"[[rules]]
id = "{id}"
order = 10
# match = "any"

[[rules.conditions]]
type = "route_name"
value = "home"

[[rules.actions]]
type = "set_header"
args = ["X-Example", "value"]
"#
    )
}

pub fn action_stub(struct_name: &str, kind: &str) -> String {
    format!(
        r#"use ruleware_engine::action::str_arg;
use ruleware_engine::{{Action, Context, EngineError}};
use serde_json::Value;

pub struct {struct_name};

impl Action for {struct_name} {{
    fn kind(&self) -> &'static str {{
        "{kind}"
    }}

    fn execute(&self, args: &[Value], _ctx: &mut Context) -> Result<(), EngineError> {{
        let _first = str_arg(args, 0);
        // TODO: implement the action, then register it from a Package.
        Ok(())
    }}
}}
"#
    )
}

pub fn condition_stub(struct_name: &str, kind: &str) -> String {
    format!(
        r#"use ruleware_engine::{{Condition, ConditionDef, Context}};
use serde_json::Value;

pub struct {struct_name};

impl Condition for {struct_name} {{
    fn kind(&self) -> &'static str {{
        "{kind}"
    }}

    fn actual(&self, _def: &ConditionDef, ctx: &mut Context) -> Value {{
        // TODO: read the value this condition inspects, then register it
        // from a Package.
        ctx.get("route.name")
    }}
}}
"#
    )
}

pub fn to_pascal(name: &str) -> String {
    name.split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect()
}

pub fn to_snake(name: &str) -> String {
    separate(name, '_')
}

pub fn to_kebab(name: &str) -> String {
    separate(name, '-')
}

fn separate(name: &str, separator: char) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    let mut prev_lower = false;
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            if c.is_ascii_uppercase() && prev_lower {
                out.push(separator);
            }
            out.push(c.to_ascii_lowercase());
            prev_lower = c.is_ascii_lowercase() || c.is_ascii_digit();
        } else {
            if !out.is_empty() && !out.ends_with(separator) {
                out.push(separator);
            }
            prev_lower = false;
        }
    }
    out.trim_matches(separator).to_string()
}
