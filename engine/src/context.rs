use once_cell::sync::Lazy;
use regex_lite::Regex;
use serde_json::Value;
use std::any::{Any, TypeId};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

static PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{([A-Za-z0-9_][A-Za-z0-9_.-]*)\}").unwrap());

/// Supplies a context value under a fixed root key, built on first access.
pub trait ContextProvider: Send + Sync {
    fn key(&self) -> &str;

    fn is_available(&self) -> bool {
        true
    }

    fn build(&self) -> Value;
}

/// Typed per-request values shared with condition and action handlers.
#[derive(Default)]
pub struct Extensions {
    entries: HashMap<TypeId, Arc<dyn Any + Send + Sync>>,
}

impl Extensions {
    pub fn insert<T: Send + Sync + 'static>(&mut self, value: Arc<T>) {
        self.entries.insert(TypeId::of::<T>(), value);
    }

    pub fn get<T: Send + Sync + 'static>(&self) -> Option<Arc<T>> {
        self.entries
            .get(&TypeId::of::<T>())
            .and_then(|value| value.clone().downcast::<T>().ok())
    }
}

/// Key-value view of the current request, populated lazily from registered
/// providers. Lives for a single rule-execution pass.
#[derive(Default)]
pub struct Context {
    values: HashMap<String, Value>,
    providers: HashMap<String, Box<dyn ContextProvider>>,
    loaded: HashSet<String>,
    extensions: Extensions,
}

impl Context {
    pub fn new() -> Self {
        Context::default()
    }

    pub fn register(&mut self, provider: Box<dyn ContextProvider>) {
        self.providers.insert(provider.key().to_string(), provider);
    }

    /// Set a root value directly, bypassing any provider for that key.
    pub fn set(&mut self, key: impl Into<String>, value: Value) {
        let key = key.into();
        self.loaded.insert(key.clone());
        self.values.insert(key, value);
    }

    /// Materialize the provider registered under `key`, once.
    pub fn load(&mut self, key: &str) {
        if self.loaded.contains(key) {
            return;
        }
        self.loaded.insert(key.to_string());

        if let Some(provider) = self.providers.get(key) {
            if provider.is_available() {
                let value = provider.build();
                self.values.insert(key.to_string(), value);
            }
        }
    }

    /// Look up a dotted path such as `route.parameters.product`, loading the
    /// root segment's provider on demand. Missing paths yield `Null`.
    pub fn get(&mut self, path: &str) -> Value {
        let root = path.split('.').next().unwrap_or(path);
        self.load(root);

        let mut current = match self.values.get(root) {
            Some(value) => value,
            None => return Value::Null,
        };
        for segment in path.split('.').skip(1) {
            match current.get(segment) {
                Some(value) => current = value,
                None => return Value::Null,
            }
        }
        current.clone()
    }

    /// Replace `{dotted.path}` placeholders with context values. Unresolved
    /// placeholders collapse to the empty string.
    pub fn interpolate(&mut self, input: &str) -> String {
        if !input.contains('{') {
            return input.to_string();
        }

        let mut out = String::with_capacity(input.len());
        let mut last = 0;
        for caps in PLACEHOLDER.captures_iter(input) {
            let (Some(whole), Some(path)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            out.push_str(&input[last..whole.start()]);
            out.push_str(&value_text(&self.get(path.as_str())));
            last = whole.end();
        }
        out.push_str(&input[last..]);
        out
    }

    pub fn extensions(&self) -> &Extensions {
        &self.extensions
    }

    pub fn extensions_mut(&mut self) -> &mut Extensions {
        &mut self.extensions
    }
}

/// Scalar rendition of a context value, used for comparisons and
/// interpolation. `Null` renders as the empty string.
pub fn value_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}
